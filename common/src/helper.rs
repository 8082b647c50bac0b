/// Writes an error followed by every error of its `source` chain.
///
/// Used by the `Debug` implementations of the error enums, so that logging an error
/// with `?error` shows what actually went wrong down the stack.
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
