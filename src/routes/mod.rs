mod health_check;
mod waitlist;

pub use health_check::*;
pub use waitlist::*;

/// Walks the `source` chain so that logs show every layer of a failure, not just the outermost
/// message.
pub fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}
