//! Locale-tag normalization.
//!
//! Host applications tend to carry locales as lowercase underscore codes
//! (`zh_cn`); the platform expects BCP 47 style tags (`zh-CN`) and only
//! supports a small set. Anything unrecognized falls back to English: the
//! game client renders its own UI, so a wrong-but-valid tag beats a rejected
//! request.

/// Map a host locale code to the platform's locale tag.
pub fn normalize_language(code: &str) -> &'static str {
    match code {
        "zh_cn" => "zh-CN",
        "zh_tw" => "zh-TW",
        "hi_in" => "hi-IN",
        "id_id" => "id-ID",
        _ => "en-US",
    }
}
