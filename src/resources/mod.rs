/**
 * This module contains all logic for loading assets from external files and for
 * turning geometry descriptors into vertex data.
 */
pub mod font;
pub mod mesh;
pub mod triangulate;

#[cfg(target_arch = "wasm32")]
fn format_url(file_name: &str) -> anyhow::Result<reqwest::Url> {
    use anyhow::Context;

    let window = web_sys::window().context("no global window")?;
    let origin = window
        .location()
        .origin()
        .map_err(|_| anyhow::anyhow!("page origin is not readable"))?;
    let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
    Ok(base.join(file_name)?)
}

/// Reads a text asset: `./assets/<file_name>` natively, `<origin>/assets/<file_name>` on the web.
pub async fn load_string(file_name: &str) -> anyhow::Result<String> {
    #[cfg(target_arch = "wasm32")]
    let txt = {
        let url = format_url(file_name)?;
        reqwest::get(url).await?.error_for_status()?.text().await?
    };
    #[cfg(not(target_arch = "wasm32"))]
    let txt = {
        let path = std::path::Path::new("./").join("assets").join(file_name);
        // Plain std IO so the future also resolves outside a tokio runtime.
        std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("{}: {}", path.display(), e))?
    };

    Ok(txt)
}
