//! Filename and content-type rewriting for the signed-URL request.

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
///
/// Replacement is per UTF-16 code unit, matching how the backend's web clients
/// sanitize: a character outside the Basic Multilingual Plane (e.g. an emoji)
/// becomes `__`. The result has the same UTF-16 length as the input, and
/// applying it twice is the same as applying it once.
pub fn sanitize_file_name(name: &str) -> String {
    let mut sanitized = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
            sanitized.push(c);
        } else {
            sanitized.extend(std::iter::repeat('_').take(c.len_utf16()));
        }
    }
    sanitized
}

/// Content type advertised to the signed-URL endpoint.
///
/// The backend expects `image/jpg` for JPEG uploads. Validation still uses the
/// client-observed type.
pub fn normalize_content_type(content_type: &str) -> &str {
    if content_type == "image/jpeg" {
        "image/jpg"
    } else {
        content_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_names_are_unchanged() {
        assert_eq!(sanitize_file_name("report-2024_v1.pdf"), "report-2024_v1.pdf");
        assert_eq!(sanitize_file_name(""), "");
    }

    #[test]
    fn unsafe_characters_become_underscores() {
        assert_eq!(sanitize_file_name("my photo (1).jpg"), "my_photo__1_.jpg");
        assert_eq!(sanitize_file_name("../etc/passwd"), ".._etc_passwd");
        assert_eq!(sanitize_file_name("a+b=c&d.png"), "a_b_c_d.png");
    }

    #[test]
    fn non_ascii_characters_are_replaced_one_for_one() {
        let input = "résumé café.pdf";
        let output = sanitize_file_name(input);
        assert_eq!(output, "r_sum__caf_.pdf");
        assert_eq!(output.chars().count(), input.chars().count());
    }

    #[test]
    fn astral_characters_become_two_underscores() {
        assert_eq!(sanitize_file_name("a😀.jpg"), "a__.jpg");
        assert_eq!(sanitize_file_name("𝒳y.png"), "__y.png");
        assert_eq!(
            sanitize_file_name("a😀.jpg").encode_utf16().count(),
            "a😀.jpg".encode_utf16().count()
        );
    }

    #[test]
    fn sanitization_is_idempotent() {
        let inputs = [
            "plain.txt",
            "with space.png",
            "ünïcödé ✓.jpg",
            "tabs\tand\nnewlines",
            "semi;colon:path/..\\x",
            "party 🎉🎉.png",
        ];
        for input in inputs {
            let once = sanitize_file_name(input);
            assert_eq!(sanitize_file_name(&once), once, "input {:?}", input);
            assert_eq!(
                once.encode_utf16().count(),
                input.encode_utf16().count()
            );
            assert!(once
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')));
        }
    }

    #[test]
    fn only_image_jpeg_is_normalized() {
        assert_eq!(normalize_content_type("image/jpeg"), "image/jpg");
        assert_eq!(normalize_content_type("image/jpg"), "image/jpg");
        assert_eq!(normalize_content_type("image/png"), "image/png");
        assert_eq!(normalize_content_type("application/pdf"), "application/pdf");
        assert_eq!(normalize_content_type("IMAGE/JPEG"), "IMAGE/JPEG");
    }
}
