use super::types::UserFormatIssue;

pub(crate) const MAX_USER_LEN: usize = 64;

/// Règles locales: atext ASCII + '.' non initial/terminal, pas de "..".
pub(crate) fn check_user(user: &str) -> Result<(), UserFormatIssue> {
    if user.len() > MAX_USER_LEN {
        return Err(UserFormatIssue::UserTooLong(user.len()));
    }
    if user.starts_with('.') || user.ends_with('.') || user.contains("..") {
        return Err(UserFormatIssue::DotPlacement);
    }
    if user.is_empty() || !user.chars().all(is_atext) {
        return Err(UserFormatIssue::Charset);
    }
    Ok(())
}

pub(crate) fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
                | '.'
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn dots() {
        assert_eq!(check_user(".abc"), Err(UserFormatIssue::DotPlacement));
        assert_eq!(check_user("abc."), Err(UserFormatIssue::DotPlacement));
        assert_eq!(check_user("a..b"), Err(UserFormatIssue::DotPlacement));
        assert!(check_user("a.b").is_ok());
    }
    #[test]
    fn charset() {
        assert!(check_user("o'neil+tag{x}").is_ok());
        assert_eq!(check_user("a b"), Err(UserFormatIssue::Charset));
        assert_eq!(check_user("\"quoted\""), Err(UserFormatIssue::Charset));
        assert_eq!(check_user("josé"), Err(UserFormatIssue::Charset));
    }
    #[test]
    fn length() {
        assert!(check_user(&"a".repeat(64)).is_ok());
        assert_eq!(
            check_user(&"a".repeat(65)),
            Err(UserFormatIssue::UserTooLong(65))
        );
    }
}
