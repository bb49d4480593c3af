use std::sync::LazyLock;

use regex::Regex;

use super::local::is_atext;
use super::types::HostFormatIssue;

// au moins un point suivi d'un TLD de 2 caractères ou plus
static HOST_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s]+\.[^\s]{2,}$").expect("static host regex")
});

/// Valide le host: pas d'espace, forme `x.tld`, charset atext minuscule.
///
/// Label rules (empty labels, hyphens, length) are left to IDNA and DNS at
/// lookup time so that typos like `gmail..com` still reach the fixer.
pub(crate) fn check_host(host: &str) -> Result<(), HostFormatIssue> {
    if host.chars().any(char::is_whitespace) {
        return Err(HostFormatIssue::Whitespace);
    }
    if !HOST_SHAPE.is_match(host) {
        return Err(HostFormatIssue::MissingTld);
    }
    if !host.chars().all(|c| is_atext(c) && !c.is_ascii_uppercase()) {
        return Err(HostFormatIssue::Charset);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn basic_host_ok() {
        assert!(check_host("gmail.com").is_ok());
        assert!(check_host("mail.example-corp.co.uk").is_ok());
    }

    #[test]
    fn tld_too_short_or_missing() {
        assert_eq!(check_host("gmail"), Err(HostFormatIssue::MissingTld));
        assert_eq!(check_host("gmail.c"), Err(HostFormatIssue::MissingTld));
        assert_eq!(check_host("localhost"), Err(HostFormatIssue::MissingTld));
    }

    #[test]
    fn whitespace_rejected_first() {
        assert_eq!(check_host("gm ail.com"), Err(HostFormatIssue::Whitespace));
        assert_eq!(check_host("gmail.c m"), Err(HostFormatIssue::Whitespace));
    }

    #[test]
    fn label_typos_pass_to_dns() {
        for host in ["gmail..com", "gmail_.com", "-gmail.com", "gmail-.com", "g!mail.com"] {
            assert!(check_host(host).is_ok(), "{host}");
        }
    }

    #[test]
    fn non_ascii_or_uppercase_rejected() {
        assert_eq!(check_host("日本.com"), Err(HostFormatIssue::Charset));
        assert_eq!(check_host("Gmail.com"), Err(HostFormatIssue::Charset));
        assert_eq!(check_host("gm(ai)l.com"), Err(HostFormatIssue::Charset));
    }
}
