/// Converts the `anyhow` errors returned by `cnidarium` into an `eyre` report,
/// keeping the chain of causes.
pub(crate) fn anyhow_to_eyre(anyhow_error: anyhow::Error) -> eyre::Report {
    let boxed: Box<dyn std::error::Error + Send + Sync> = anyhow_error.into();
    eyre::eyre!(boxed)
}
