//!
//! src/credential.rs  Andrew Belles  Oct 16th, 2026
//!
//! Resolves the discogs access token once at start-up
//!

use std::io::{self, BufRead, IsTerminal, Write};

use crate::errors::CrawlerError;
use crate::types::AccessToken;

///
/// Environment first, then a prompt. On a terminal the answer is read
/// with echo disabled; piped stdin is read as a single line.
///
pub fn resolve_token(env_var: &str) -> Result<AccessToken, CrawlerError> {
    if let Some(token) = token_from_env(env_var) {
        return Ok(token);
    }

    let stdin = io::stdin();
    if stdin.is_terminal() {
        let answer = rpassword::prompt_password(prompt_text(env_var))?;
        return token_from_answer(env_var, &answer);
    }

    let mut stderr = io::stderr();
    prompt_token(env_var, &mut stdin.lock(), &mut stderr)
}

fn token_from_env(env_var: &str) -> Option<AccessToken> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Some(AccessToken::new(v.trim())),
        _ => None
    }
}

fn prompt_token<R: BufRead, W: Write>(env_var: &str, input: &mut R, prompt: &mut W) ->
    Result<AccessToken, CrawlerError> {

    write!(prompt, "{}", prompt_text(env_var))?;
    prompt.flush()?;

    let answer = rpassword::read_password_from_bufread(input)?;
    token_from_answer(env_var, &answer)
}

fn prompt_text(env_var: &str) -> String {
    format!("Enter your Discogs token (you can also set the environment variable {env_var}): ")
}

fn token_from_answer(env_var: &str, answer: &str) -> Result<AccessToken, CrawlerError> {
    let token = answer.trim();
    if token.is_empty() {
        return Err(CrawlerError::Config(format!("{env_var} was not set and no token was entered")));
    }
    Ok(AccessToken::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_reads_one_trimmed_line() {
        let mut input = "  abc123 \nignored\n".as_bytes();
        let mut shown = Vec::new();

        let token = prompt_token("DISCOGS_TOKEN", &mut input, &mut shown).unwrap();

        assert_eq!(token.as_str(), "abc123");
        let shown = String::from_utf8(shown).unwrap();
        assert!(shown.contains("DISCOGS_TOKEN"));
        assert!(!shown.contains("abc123"));
    }

    #[test]
    fn blank_answer_is_rejected() {
        let mut input = "\n".as_bytes();
        let err = prompt_token("DISCOGS_TOKEN", &mut input, &mut io::sink()).unwrap_err();
        assert!(matches!(err, CrawlerError::Config(_)));
    }

    #[test]
    fn closed_stdin_is_rejected() {
        let mut input = "".as_bytes();
        assert!(prompt_token("DISCOGS_TOKEN", &mut input, &mut io::sink()).is_err());
    }

    #[test]
    fn crlf_answer_is_stripped() {
        let mut input = "abc123\r\n".as_bytes();
        let token = prompt_token("DISCOGS_TOKEN", &mut input, &mut io::sink()).unwrap();
        assert_eq!(token.as_str(), "abc123");
    }

    #[test]
    fn whitespace_answer_is_rejected() {
        let err = token_from_answer("DISCOGS_TOKEN", "   ").unwrap_err();
        assert!(err.to_string().contains("DISCOGS_TOKEN"));
    }

    #[test]
    fn unset_env_falls_through() {
        assert!(token_from_env("BARCODE_CRAWLER_TEST_UNSET_TOKEN").is_none());
    }
}
