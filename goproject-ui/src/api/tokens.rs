//! Token storage in the browser's local storage

use serde::Deserialize;

pub const ACCESS_TOKEN: &str = "access";
pub const REFRESH_TOKEN: &str = "refresh";

fn storage() -> Option<web_sys::Storage> {
    web_sys::window()?.local_storage().ok().flatten()
}

pub fn get(key: &str) -> Option<String> {
    storage()?.get_item(key).ok().flatten()
}

pub fn set(key: &str, value: &str) {
    if let Some(storage) = storage() {
        let _ = storage.set_item(key, value);
    }
}

pub fn save_pair(access: &str, refresh: &str) {
    set(ACCESS_TOKEN, access);
    set(REFRESH_TOKEN, refresh);
}

/// Forget both tokens
pub fn clear() {
    if let Some(storage) = storage() {
        let _ = storage.remove_item(ACCESS_TOKEN);
        let _ = storage.remove_item(REFRESH_TOKEN);
    }
}

#[derive(Deserialize)]
struct ExpiryClaim {
    exp: i64,
}

/// Base64url (unpadded) to the standard alphabet `atob` accepts
pub fn to_standard_base64(segment: &str) -> String {
    let mut out: String = segment
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    while out.len() % 4 != 0 {
        out.push('=');
    }
    out
}

/// `exp` claim of a JWT, in seconds; the signature is not checked here
pub fn expiry(token: &str) -> Option<i64> {
    let payload = token.split('.').nth(1)?;
    let json = web_sys::window()?
        .atob(&to_standard_base64(payload))
        .ok()?;
    serde_json::from_str::<ExpiryClaim>(&json).ok().map(|c| c.exp)
}
