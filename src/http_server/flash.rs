//! One-shot notices carried across a redirect in a cookie.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

pub const FLASH_COOKIE: &str = "booking_flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    /// CSS class suffix used by the layout.
    pub fn css_class(&self) -> &'static str {
        match self.level {
            FlashLevel::Success => "success",
            FlashLevel::Error => "danger",
        }
    }
}

/// Notices left by the previous response plus any queued while handling
/// the current request.
#[derive(Debug)]
pub struct Flash {
    jar: CookieJar,
    messages: Vec<FlashMessage>,
}

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        let messages = jar
            .get(FLASH_COOKIE)
            .map(|cookie| decode(cookie.value()))
            .unwrap_or_default();
        Ok(Flash { jar, messages })
    }
}

fn decode(value: &str) -> Vec<FlashMessage> {
    // The jar may already have percent-decoded the value
    if let Ok(messages) = serde_json::from_str(value) {
        return messages;
    }
    let json = match urlencoding::decode(value) {
        Ok(json) => json,
        Err(e) => {
            log::warn!("Ignoring undecodable flash cookie: {}", e);
            return Vec::new();
        }
    };
    serde_json::from_str(&json).unwrap_or_else(|e| {
        log::warn!("Ignoring malformed flash cookie: {}", e);
        Vec::new()
    })
}

fn encode(messages: &[FlashMessage]) -> Option<String> {
    match serde_json::to_string(messages) {
        Ok(json) => Some(urlencoding::encode(&json).into_owned()),
        Err(e) => {
            log::error!("Failed to encode flash messages: {}", e);
            None
        }
    }
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build(FLASH_COOKIE).path("/").build()
}

impl Flash {
    pub fn success(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Success, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(FlashLevel::Error, message.into());
    }

    fn push(&mut self, level: FlashLevel, message: String) {
        self.messages.push(FlashMessage { level, message });
    }

    /// Drain every pending notice for display. The returned jar clears the
    /// cookie and must be part of the response.
    pub fn take(self) -> (CookieJar, Vec<FlashMessage>) {
        let jar = if self.jar.get(FLASH_COOKIE).is_some() {
            self.jar.remove(removal_cookie())
        } else {
            self.jar
        };
        (jar, self.messages)
    }

    /// Redirect, keeping pending notices for the page the browser lands on.
    pub fn redirect(self, to: &str) -> Response {
        let jar = match (self.messages.is_empty(), encode(&self.messages)) {
            (false, Some(value)) => self.jar.add(
                Cookie::build((FLASH_COOKIE, value))
                    .path("/")
                    .http_only(true)
                    .same_site(SameSite::Lax),
            ),
            _ => self.jar.remove(removal_cookie()),
        };
        (jar, Redirect::to(to)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode, header};

    async fn flash_from(cookie: Option<&str>) -> Flash {
        let mut builder = Request::builder().uri("/");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Flash::from_request_parts(&mut parts, &()).await.unwrap()
    }

    fn set_cookie_value(response: &Response) -> String {
        let header = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        let pair = header.split(';').next().unwrap();
        pair.trim_start_matches(&format!("{FLASH_COOKIE}=")).to_string()
    }

    #[tokio::test]
    async fn test_redirect_carries_messages_to_next_request() {
        let mut flash = flash_from(None).await;
        flash.success("Venue The Musical Hop was successfully listed!");
        let response = flash.redirect("/venues/1");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/venues/1");

        let value = set_cookie_value(&response);
        let next = flash_from(Some(&format!("{FLASH_COOKIE}={value}"))).await;
        let (_, messages) = next.take();
        assert_eq!(
            messages,
            vec![FlashMessage {
                level: FlashLevel::Success,
                message: "Venue The Musical Hop was successfully listed!".into(),
            }]
        );
    }

    #[tokio::test]
    async fn test_take_keeps_messages_queued_in_same_request() {
        let mut flash = flash_from(None).await;
        flash.error("An error occurred. Show could not be listed.");
        let (_, messages) = flash.take();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].css_class(), "danger");
    }

    #[tokio::test]
    async fn test_malformed_cookie_is_ignored() {
        let flash = flash_from(Some(&format!("{FLASH_COOKIE}=%7Bnot-json"))).await;
        let (_, messages) = flash.take();
        assert!(messages.is_empty());
    }
}
