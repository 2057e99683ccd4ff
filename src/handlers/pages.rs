// Server-rendered pages: login, memos and the Google token-flow landing page
use crate::errors::login_error_message;
use crate::memo::{relative_time, sample_memos, CreateMemoRequest, Memo};
use crate::oauth::{OAuthConfig, OAuthProvider};
use crate::routes;
use crate::utils::redirect_validator::validate_return_path;
use crate::utils::responses::ResponseBuilder;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Result};
use chrono::Utc;
use log::info;
use serde::Deserialize;

const TITLE: &str = "Lekha";
const TAGLINE: &str = "당신의 생각이 💭 글이 되도록 ✏️";

#[derive(Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
    pub redirect: Option<String>,
}

/// `GET /login`
///
/// # Errors
///
/// Never returns an error
pub async fn login_page(
    query: web::Query<LoginQuery>,
    oauth_config: web::Data<OAuthConfig>,
) -> Result<HttpResponse> {
    let redirect = query
        .redirect
        .as_deref()
        .and_then(|candidate| validate_return_path(candidate).ok());
    let error_message = query
        .error
        .as_deref()
        .filter(|code| !code.is_empty())
        .map(login_error_message);

    Ok(ResponseBuilder::html(
        StatusCode::OK,
        render_login_page(
            &oauth_config.configured_providers(),
            redirect.as_deref(),
            error_message,
        ),
    ))
}

/// `GET /memos`
///
/// # Errors
///
/// Never returns an error
pub async fn memos_page() -> Result<HttpResponse> {
    Ok(ResponseBuilder::html(
        StatusCode::OK,
        render_memos_page(&sample_memos(Utc::now()), "", None),
    ))
}

/// `POST /memos` validates the memo; persistence is not wired in yet
///
/// # Errors
///
/// Never returns an error; invalid input re-renders the page with `400`
pub async fn create_memo(form: web::Form<CreateMemoRequest>) -> Result<HttpResponse> {
    match form.validated() {
        Ok(memo) => {
            info!("Memo submitted ({} characters)", memo.content.chars().count());
            Ok(ResponseBuilder::redirect(routes::MEMOS, Vec::new()))
        }
        Err(e) => Ok(ResponseBuilder::html(
            StatusCode::BAD_REQUEST,
            render_memos_page(
                &sample_memos(Utc::now()),
                &form.content,
                Some(&e.to_string()),
            ),
        )),
    }
}

/// `GET /auth/google/callback`
///
/// Google's token flow returns the access token in the URL fragment, which only
/// the browser can read. The page posts it to `/auth/google` and follows the answer.
///
/// # Errors
///
/// Never returns an error
pub async fn google_callback_page() -> Result<HttpResponse> {
    Ok(ResponseBuilder::html(
        StatusCode::OK,
        render_google_callback_page(),
    ))
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ko">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/app.css">
</head>
<body>
{body}
</body>
</html>"#
    )
}

fn provider_button(provider: OAuthProvider, redirect: Option<&str>) -> String {
    let mut href = routes::sign_in_path(provider.slug());
    if let Some(redirect) = redirect {
        href = format!("{href}?redirect={}", urlencoding::encode(redirect));
    }
    format!(
        r#"<a href="{}" class="provider-button provider-{}">{provider}로 계속하기</a>"#,
        escape_html(&href),
        provider.slug()
    )
}

fn render_login_page(
    providers: &[OAuthProvider],
    redirect: Option<&str>,
    error_message: Option<&str>,
) -> String {
    let buttons = providers
        .iter()
        .map(|provider| provider_button(*provider, redirect))
        .collect::<Vec<_>>()
        .join("\n            ");
    let error = error_message
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    page(
        &format!("로그인 - {TITLE}"),
        &format!(
            r#"<main class="login">
    <div class="login-box">
        <h1>{TITLE}</h1>
        <p class="tagline">{TAGLINE}</p>
        <div class="button-container">
            {buttons}
        </div>
        {error}
    </div>
</main>"#
        ),
    )
}

fn memo_card(memo: &Memo, now: chrono::DateTime<Utc>) -> String {
    format!(
        r#"<article class="memo-card" data-memo-id="{}">
            <p>{}</p>
            <footer>
                <span class="timestamp">{}</span>
                <span class="actions"><button type="button">수정</button><button type="button">삭제</button></span>
            </footer>
        </article>"#,
        memo.id,
        escape_html(&memo.content),
        relative_time(memo.created_at, now)
    )
}

fn render_memos_page(memos: &[Memo], draft: &str, error_message: Option<&str>) -> String {
    let now = Utc::now();
    let cards = memos
        .iter()
        .map(|memo| memo_card(memo, now))
        .collect::<Vec<_>>()
        .join("\n        ");
    let error = error_message
        .map(|message| format!(r#"<p class="error">{}</p>"#, escape_html(message)))
        .unwrap_or_default();

    page(
        &format!("메모 - {TITLE}"),
        &format!(
            r#"<main class="memos">
    <header>
        <h1>메모</h1>
        <p>빠르게 생각을 기록하세요</p>
        <form method="post" action="{logout}"><button type="submit" class="logout">로그아웃</button></form>
    </header>
    <section class="memo-list">
        {cards}
    </section>
</main>
<form class="memo-input" method="post" action="{memos}">
    <textarea name="content" placeholder="메모를 작성하세요..." maxlength="1000" autofocus>{draft}</textarea>
    {error}
    <div class="memo-input-actions">
        <button type="reset" class="secondary">취소</button>
        <button type="submit" class="primary">작성 완료</button>
    </div>
</form>"#,
            logout = routes::LOGOUT,
            memos = routes::MEMOS,
            draft = escape_html(draft),
        ),
    )
}

fn render_google_callback_page() -> String {
    page(
        &format!("로그인 중 - {TITLE}"),
        &format!(
            r#"<main class="login">
    <div class="login-box">
        <p id="status">로그인 중...</p>
    </div>
</main>
<script>
(function () {{
    var params = new URLSearchParams(window.location.hash.substring(1));
    var token = params.get("access_token");
    if (!token) {{
        window.location.replace("{login}?error=no_code");
        return;
    }}
    fetch("{token_login}", {{
        method: "POST",
        credentials: "same-origin",
        headers: {{ "Content-Type": "application/json" }},
        body: JSON.stringify({{ access_token: token }})
    }})
        .then(function (response) {{
            return response.json().then(function (body) {{
                if (response.ok) {{
                    window.location.replace(body.redirect);
                }} else {{
                    window.location.replace("{login}?error=" + encodeURIComponent(body.error || "unknown"));
                }}
            }});
        }})
        .catch(function () {{
            window.location.replace("{login}?error=unknown");
        }});
}})();
</script>"#,
            login = routes::LOGIN,
            token_login = routes::GOOGLE_TOKEN_LOGIN,
        ),
    )
}
