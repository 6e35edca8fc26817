// Avatar resolution: turns a fetched `User` into the CDN URL of their
// avatar and the name of the file it should be saved as. Everything in here
// is pure so it can be tested without a network.

use crate::api::User;

/// Hashes with this prefix belong to animated avatars.
const ANIMATED_PREFIX: &str = "a_";
/// Number of built-in placeholder avatars on the CDN.
const DEFAULT_AVATAR_COUNT: u32 = 5;
const PLACEHOLDER_USERNAME: &str = "user";

/// Where a user's avatar lives and what extension it is saved with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarTarget {
    pub url: String,
    pub extension: String,
}

/// Resolve the avatar URL for `user` against `cdn_base`.
///
/// Users with a custom avatar get `{cdn}/avatars/{id}/{hash}.{png|gif}?size=2048`;
/// everyone else gets one of the default images picked from their discriminator.
pub fn resolve(user: &User, cdn_base: &str) -> AvatarTarget {
    let url = match user.avatar.as_deref().filter(|hash| !hash.is_empty()) {
        Some(hash) => {
            let ext = if hash.starts_with(ANIMATED_PREFIX) {
                "gif"
            } else {
                "png"
            };
            format!("{cdn_base}/avatars/{}/{hash}.{ext}?size=2048", user.id)
        }
        None => {
            let index = default_avatar_index(user.discriminator.as_deref());
            format!("{cdn_base}/embed/avatars/{index}.png")
        }
    };
    let extension = extension_from_url(&url).to_string();
    AvatarTarget { url, extension }
}

/// Index (0-4) of the placeholder avatar for a discriminator. Missing or
/// unparseable discriminators map to 0.
pub fn default_avatar_index(discriminator: Option<&str>) -> u8 {
    discriminator.and_then(rem_of_integer).unwrap_or(0)
}

/// Non-negative remainder of a signed decimal integer of any length.
fn rem_of_integer(text: &str) -> Option<u8> {
    let text = text.trim();
    let (negative, digits) = match text.as_bytes().first()? {
        b'-' => (true, &text[1..]),
        b'+' => (false, &text[1..]),
        _ => (false, text),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let rem = digits
        .bytes()
        .fold(0, |acc, b| (acc * 10 + u32::from(b - b'0')) % DEFAULT_AVATAR_COUNT);
    let rem = if negative && rem != 0 {
        DEFAULT_AVATAR_COUNT - rem
    } else {
        rem
    };
    Some(rem as u8)
}

/// Text after the last `.` of the URL, ignoring any query string.
pub fn extension_from_url(url: &str) -> &str {
    let path = url.split('?').next().unwrap_or(url);
    path.rsplit('.').next().unwrap_or(path)
}

/// `<username>_<user_id>.<extension>`, with `/` replaced so the result is a
/// single path segment.
pub fn output_file_name(user: &User, user_id: &str, target: &AvatarTarget) -> String {
    let username = user.username.as_deref().unwrap_or(PLACEHOLDER_USERNAME);
    format!("{username}_{user_id}.{}", target.extension).replace('/', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CDN: &str = "https://cdn.discordapp.com";

    fn user(avatar: Option<&str>, discriminator: Option<&str>) -> User {
        User {
            id: "80351110224678912".into(),
            username: Some("nelly".into()),
            discriminator: discriminator.map(String::from),
            avatar: avatar.map(String::from),
        }
    }

    #[test]
    fn static_avatar_is_png() {
        let target = resolve(&user(Some("8342729096ea3675442027381ff50dfe"), None), CDN);
        assert_eq!(
            target.url,
            "https://cdn.discordapp.com/avatars/80351110224678912/8342729096ea3675442027381ff50dfe.png?size=2048"
        );
        assert_eq!(target.extension, "png");
    }

    #[test]
    fn animated_avatar_is_gif() {
        let target = resolve(&user(Some("a_1269e74af4df7417b13759eae50c83dc"), None), CDN);
        assert!(target.url.ends_with("/a_1269e74af4df7417b13759eae50c83dc.gif?size=2048"));
        assert_eq!(target.extension, "gif");
    }

    #[test]
    fn default_avatar_uses_discriminator() {
        let target = resolve(&user(None, Some("7")), CDN);
        assert_eq!(target.url, "https://cdn.discordapp.com/embed/avatars/2.png");
        assert_eq!(target.extension, "png");
    }

    #[test]
    fn empty_hash_falls_back_to_default() {
        let target = resolve(&user(Some(""), Some("1337")), CDN);
        assert_eq!(target.url, "https://cdn.discordapp.com/embed/avatars/2.png");
    }

    #[test]
    fn default_index_edge_cases() {
        assert_eq!(default_avatar_index(None), 0);
        assert_eq!(default_avatar_index(Some("abc")), 0);
        assert_eq!(default_avatar_index(Some("")), 0);
        assert_eq!(default_avatar_index(Some("0")), 0);
        assert_eq!(default_avatar_index(Some("0004")), 4);
        assert_eq!(default_avatar_index(Some("-1")), 4);
        assert_eq!(default_avatar_index(Some("+7")), 2);
        assert_eq!(default_avatar_index(Some("-")), 0);
        assert_eq!(default_avatar_index(Some("1.5")), 0);
    }

    #[test]
    fn default_index_handles_integers_wider_than_64_bits() {
        assert_eq!(
            default_avatar_index(Some("99999999999999999999999999999997")),
            2
        );
        assert_eq!(default_avatar_index(Some("-99999999999999999999999999")), 1);
    }

    #[test]
    fn missing_discriminator_uses_first_default() {
        let target = resolve(&user(None, None), CDN);
        assert_eq!(target.url, "https://cdn.discordapp.com/embed/avatars/0.png");
    }

    #[test]
    fn extension_ignores_query() {
        assert_eq!(extension_from_url("https://x/a/b.gif?size=2048"), "gif");
        assert_eq!(extension_from_url("https://x/embed/avatars/3.png"), "png");
    }

    #[test]
    fn file_name_replaces_slashes_and_defaults_username() {
        let target = AvatarTarget {
            url: "https://x/1.png".into(),
            extension: "png".into(),
        };
        let mut u = user(None, None);
        u.username = Some("a/b".into());
        assert_eq!(output_file_name(&u, "42", &target), "a_b_42.png");

        u.username = None;
        assert_eq!(output_file_name(&u, "42", &target), "user_42.png");
    }
}
