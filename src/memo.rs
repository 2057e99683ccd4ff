//! Memo wire types, request validation and the sample memos shown on the memo page

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

const MAX_CONTENT_CHARS: usize = 1000;
const MAX_ASSIST_LIMIT: i64 = 20;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoValidationError {
    #[error("메모 내용을 입력해주세요")]
    EmptyContent,
    #[error("메모는 1000자를 초과할 수 없습니다")]
    ContentTooLong,
    #[error("프롬프트를 입력해주세요")]
    EmptyPrompt,
    #[error("프롬프트는 1000자를 초과할 수 없습니다")]
    PromptTooLong,
    #[error("limit은 0 이상이어야 합니다")]
    LimitTooSmall,
    #[error("limit은 20 이하여야 합니다")]
    LimitTooLarge,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Memo {
    pub id: i64,
    pub user_id: i64,
    pub content: String,
    pub is_pinned: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn validate_content(raw: &str) -> Result<String, MemoValidationError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(MemoValidationError::EmptyContent);
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(MemoValidationError::ContentTooLong);
    }
    Ok(content.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateMemoRequest {
    pub content: String,
}

impl CreateMemoRequest {
    /// Trimmed copy of the request, rejecting empty or overlong content
    ///
    /// # Errors
    ///
    /// Returns the message to show next to the memo input
    pub fn validated(&self) -> Result<Self, MemoValidationError> {
        Ok(Self {
            content: validate_content(&self.content)?,
        })
    }
}

/// Wire type for memo edits; no route accepts it yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateMemoRequest {
    pub content: String,
}

impl UpdateMemoRequest {
    /// # Errors
    ///
    /// Same rules as [`CreateMemoRequest::validated`]
    pub fn validated(&self) -> Result<Self, MemoValidationError> {
        Ok(Self {
            content: validate_content(&self.content)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl AssistRequest {
    /// # Errors
    ///
    /// Returns an error for an empty or overlong prompt, or a limit outside `0..=20`
    pub fn validated(&self) -> Result<Self, MemoValidationError> {
        let prompt = self.prompt.trim();
        if prompt.is_empty() {
            return Err(MemoValidationError::EmptyPrompt);
        }
        if prompt.chars().count() > MAX_CONTENT_CHARS {
            return Err(MemoValidationError::PromptTooLong);
        }
        match self.limit {
            Some(limit) if limit < 0 => return Err(MemoValidationError::LimitTooSmall),
            Some(limit) if limit > MAX_ASSIST_LIMIT => {
                return Err(MemoValidationError::LimitTooLarge)
            }
            _ => {}
        }
        Ok(Self {
            prompt: prompt.to_string(),
            limit: self.limit,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SimilarMemo {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssistResponse {
    pub suggestion: String,
    pub similar_memos: Vec<SimilarMemo>,
}

/// Memos shown on the memo page until the memo API is wired in
#[must_use]
pub fn sample_memos(now: DateTime<Utc>) -> Vec<Memo> {
    let samples = [
        (
            "오늘 아침에 떠오른 아이디어: AI 기반 글쓰기 도구에 메모 기능을 추가하면 어떨까? 사용자들이 짧은 생각들을 빠르게 기록하고, 나중에 이를 바탕으로 긴 글을 작성할 수 있을 것 같다.",
            Duration::hours(2),
        ),
        (
            "프로젝트 회의 메모: 디자인 시스템 색상 팔레트 결정. Primary는 코랄 계열, Secondary는 민트 계열로 가기로 함.",
            Duration::hours(5),
        ),
        (
            "읽을 책 목록: 웨스 앤더슨 감독의 영화 미학을 다룬 책 찾아보기. 디자인 시스템에 영감을 줄 수 있을 것 같음.",
            Duration::days(1),
        ),
    ];

    samples
        .into_iter()
        .zip(1..)
        .map(|((content, age), id)| Memo {
            id,
            user_id: 0,
            content: content.to_string(),
            is_pinned: false,
            created_at: now - age,
            updated_at: now - age,
        })
        .collect()
}

/// Korean relative time such as `2시간 전`
#[must_use]
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(created_at);
    if elapsed.num_minutes() < 1 {
        "방금 전".to_string()
    } else if elapsed.num_hours() < 1 {
        format!("{}분 전", elapsed.num_minutes())
    } else if elapsed.num_days() < 1 {
        format!("{}시간 전", elapsed.num_hours())
    } else {
        format!("{}일 전", elapsed.num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_is_trimmed() {
        let request = CreateMemoRequest {
            content: "  장보기 목록  \n".to_string(),
        };
        assert_eq!(request.validated().unwrap().content, "장보기 목록");
    }

    #[test]
    fn test_content_bounds() {
        let blank = CreateMemoRequest {
            content: "   ".to_string(),
        };
        assert_eq!(blank.validated(), Err(MemoValidationError::EmptyContent));

        // 1000 Hangul syllables are 3000 bytes but still within the limit
        let max = UpdateMemoRequest {
            content: "가".repeat(1000),
        };
        assert!(max.validated().is_ok());

        let over = UpdateMemoRequest {
            content: "가".repeat(1001),
        };
        let err = over.validated().unwrap_err();
        assert_eq!(err.to_string(), "메모는 1000자를 초과할 수 없습니다");
    }

    #[test]
    fn test_assist_limit_bounds() {
        let request = |limit| AssistRequest {
            prompt: "비슷한 메모 찾아줘".to_string(),
            limit,
        };
        assert!(request(None).validated().is_ok());
        assert!(request(Some(0)).validated().is_ok());
        assert!(request(Some(20)).validated().is_ok());
        assert_eq!(
            request(Some(-1)).validated(),
            Err(MemoValidationError::LimitTooSmall)
        );
        assert_eq!(
            request(Some(21)).validated(),
            Err(MemoValidationError::LimitTooLarge)
        );
        assert_eq!(
            AssistRequest {
                prompt: String::new(),
                limit: None
            }
            .validated(),
            Err(MemoValidationError::EmptyPrompt)
        );
    }

    #[test]
    fn test_assist_response_wire_format() {
        let body = r#"{
            "suggestion": "회의 메모를 정리해보세요",
            "similar_memos": [
                {"id": 3, "content": "프로젝트 회의 메모", "created_at": "2024-05-01T10:00:00Z"}
            ]
        }"#;
        let response: AssistResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.similar_memos.len(), 1);
        assert_eq!(response.similar_memos[0].id, 3);
    }

    #[test]
    fn test_relative_time() {
        let now = Utc::now();
        assert_eq!(relative_time(now, now), "방금 전");
        assert_eq!(relative_time(now - Duration::minutes(5), now), "5분 전");
        assert_eq!(relative_time(now - Duration::hours(2), now), "2시간 전");
        assert_eq!(relative_time(now - Duration::days(3), now), "3일 전");
    }

    #[test]
    fn test_sample_memos_are_newest_first() {
        let now = Utc::now();
        let memos = sample_memos(now);
        assert_eq!(memos.len(), 3);
        assert_eq!(relative_time(memos[0].created_at, now), "2시간 전");
        assert_eq!(relative_time(memos[2].created_at, now), "1일 전");
        assert!(memos.windows(2).all(|w| w[0].created_at > w[1].created_at));
    }
}
