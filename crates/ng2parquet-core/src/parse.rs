// Access-log line parser
//
// Matches one line of the combined access-log format:
//
//   <ipv4> - <user> [<time_local>] "<method> <url> <protocol>" <status> <bytes> "<referrer>" "<user_agent>"
//
// Only this one grammar is supported. A line either matches in full or
// yields `ParseOutcome::NoMatch`; there are no partially filled records.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::field_names as field;

static LINE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?P<remote_addr>[0-9]+\.[0-9]+\.[0-9]+\.[0-9]+) - ",
        r"(?P<remote_user>\S+) ",
        r"\[(?P<time_local>[^\]]+)\] ",
        r#""(?P<request_method>\S+) "#,
        r"(?P<request_url>\S+) ",
        r#"(?P<request_protocol>\S+)" "#,
        r"(?P<response_status>[0-9]+) ",
        r"(?P<bytes_sent>[0-9]+) ",
        r#""(?P<http_referrer>\S+)" "#,
        r#""(?P<http_user_agent>.+)"$"#,
    ))
    .expect("access log pattern is a valid regex")
});

/// Untyped captures from one access-log line, exactly as they appeared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFields {
    pub remote_addr: String,
    pub remote_user: String,
    pub time_local: String,
    pub request_method: String,
    pub request_url: String,
    pub request_protocol: String,
    pub response_status: String,
    pub bytes_sent: String,
    pub http_referrer: String,
    pub http_user_agent: String,
}

/// Result of matching one line against the grammar
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    Matched(RawFields),
    NoMatch,
}

impl ParseOutcome {
    pub fn into_fields(self) -> Option<RawFields> {
        match self {
            ParseOutcome::Matched(fields) => Some(fields),
            ParseOutcome::NoMatch => None,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, ParseOutcome::Matched(_))
    }
}

/// Parse one access-log line.
///
/// A trailing `\n` or `\r\n` is ignored; anything else after the closing
/// user-agent quote makes the line a `NoMatch`.
pub fn parse_line(line: &str) -> ParseOutcome {
    let line = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line);

    let Some(caps) = LINE_PATTERN.captures(line) else {
        return ParseOutcome::NoMatch;
    };

    // Every group is mandatory in the pattern, so a successful match has all ten.
    let take = |name: &str| caps[name].to_string();

    ParseOutcome::Matched(RawFields {
        remote_addr: take(field::REMOTE_ADDR),
        remote_user: take(field::REMOTE_USER),
        time_local: take(field::TIME_LOCAL),
        request_method: take(field::REQUEST_METHOD),
        request_url: take(field::REQUEST_URL),
        request_protocol: take(field::REQUEST_PROTOCOL),
        response_status: take(field::RESPONSE_STATUS),
        bytes_sent: take(field::BYTES_SENT),
        http_referrer: take(field::HTTP_REFERRER),
        http_user_agent: take(field::HTTP_USER_AGENT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE: &str = r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET /index.html HTTP/1.1" 200 2326 "-" "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/118.0""#;

    #[test]
    fn test_parse_combined_line() {
        let fields = parse_line(LINE).into_fields().expect("line should match");

        assert_eq!(fields.remote_addr, "203.0.113.7");
        assert_eq!(fields.remote_user, "-");
        assert_eq!(fields.time_local, "10/Oct/2023:13:55:36 +0900");
        assert_eq!(fields.request_method, "GET");
        assert_eq!(fields.request_url, "/index.html");
        assert_eq!(fields.request_protocol, "HTTP/1.1");
        assert_eq!(fields.response_status, "200");
        assert_eq!(fields.bytes_sent, "2326");
        assert_eq!(fields.http_referrer, "-");
        assert_eq!(
            fields.http_user_agent,
            "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/118.0"
        );
    }

    #[test]
    fn test_line_terminators_are_ignored() {
        let lf = format!("{}\n", LINE);
        let crlf = format!("{}\r\n", LINE);

        assert_eq!(parse_line(&lf), parse_line(LINE));
        assert_eq!(parse_line(&crlf), parse_line(LINE));
    }

    #[test]
    fn test_user_and_referrer_captured_verbatim() {
        let line = r#"10.0.0.1 - alice [01/Jan/2024:00:00:01] "POST /api/v1/items?id=3 HTTP/2.0" 201 0 "https://example.com/form" "curl/8.4.0""#;
        let fields = parse_line(line).into_fields().unwrap();

        assert_eq!(fields.remote_user, "alice");
        assert_eq!(fields.time_local, "01/Jan/2024:00:00:01");
        assert_eq!(fields.request_url, "/api/v1/items?id=3");
        assert_eq!(fields.http_referrer, "https://example.com/form");
        assert_eq!(fields.http_user_agent, "curl/8.4.0");
    }

    #[test]
    fn test_rejects_malformed_lines() {
        let cases = [
            // non-numeric status
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" OK 12 "-" "ua""#,
            // missing request quotes
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] GET / HTTP/1.1 200 12 "-" "ua""#,
            // hostname instead of IPv4
            r#"example.com - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua""#,
            // three-part address
            r#"10.0.1 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua""#,
            // referrer containing a space
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "a b" "ua""#,
            // double space between fields
            r#"203.0.113.7 -  - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua""#,
            // leading garbage
            r#"x 203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua""#,
            // trailing garbage after the user agent
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua" extra"#,
            // Arabic-Indic digits in status, bytes and address
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" ٢٠٠ 12 "-" "ua""#,
            r#"203.0.113.7 - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 ١٢ "-" "ua""#,
            r#"٢٠٣.٠.١١٣.٧ - - [10/Oct/2023:13:55:36 +0900] "GET / HTTP/1.1" 200 12 "-" "ua""#,
            "",
        ];

        for line in cases {
            assert_eq!(parse_line(line), ParseOutcome::NoMatch, "line: {line}");
        }
    }

    #[test]
    fn test_user_agent_may_contain_quotes() {
        let line = r#"192.168.0.1 - - [10/Oct/2023:13:55:36] "GET / HTTP/1.1" 304 0 "-" "bot "v2" (compatible)""#;
        let fields = parse_line(line).into_fields().unwrap();
        assert_eq!(fields.http_user_agent, r#"bot "v2" (compatible)"#);
    }
}
