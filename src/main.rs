//! Binary entrypoint that prints recent-conversation summaries as JSON.

use std::process::ExitCode;

use conversation_digest::start;

/// Run the digest once against `DIGEST_BASE_URL`.
fn main() -> ExitCode {
    start::run()
}
