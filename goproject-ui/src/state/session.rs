//! Session check run before protected routes render

use crate::api::{self, tokens};

/// Whether the stored tokens still open a session
///
/// An expired access token is exchanged for a new pair when a refresh token
/// is stored; anything unreadable counts as logged out.
pub async fn is_authorized() -> bool {
    let Some(access) = tokens::get(tokens::ACCESS_TOKEN) else {
        log("No access token found");
        return false;
    };
    let Some(exp) = tokens::expiry(&access) else {
        log("Unreadable access token");
        return false;
    };

    let now = (js_sys::Date::now() / 1000.0) as i64;
    if exp >= now {
        return true;
    }

    let Some(refresh) = tokens::get(tokens::REFRESH_TOKEN) else {
        log("Access token expired and no refresh token stored");
        return false;
    };
    match api::refresh(&refresh).await {
        Ok(pair) => {
            tokens::save_pair(&pair.access, &pair.refresh);
            true
        }
        Err(e) => {
            log(&format!("Token refresh failed: {:?}", e));
            false
        }
    }
}

fn log(message: &str) {
    web_sys::console::log_1(&message.into());
}
