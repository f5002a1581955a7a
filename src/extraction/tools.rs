//! Helpers for the external command-line tools used during extraction.

use std::path::Path;

use tokio::process::Command;

use super::strategy::StrategyError;

/// Tools the local strategies shell out to.
pub const EXTERNAL_TOOLS: &[(&str, &str)] = &[
    ("pdftotext", "poppler-utils"),
    ("pdfinfo", "poppler-utils"),
    ("pdftoppm", "poppler-utils"),
    ("tesseract", "tesseract-ocr"),
];

/// Check whether a binary is on the PATH.
pub fn check_binary(name: &str) -> bool {
    which::which(name).is_ok()
}

/// Report each external tool and whether it is installed.
pub fn check_tools() -> Vec<(&'static str, &'static str, bool)> {
    EXTERNAL_TOOLS
        .iter()
        .map(|(tool, package)| (*tool, *package, check_binary(tool)))
        .collect()
}

/// Handle command output, extracting stdout on success or returning appropriate error.
pub fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, StrategyError> {
    match result {
        Ok(output) => {
            if output.status.success() {
                Ok(String::from_utf8_lossy(&output.stdout).to_string())
            } else {
                let stderr = String::from_utf8_lossy(&output.stderr);
                Err(StrategyError::Failed(format!(
                    "{}: {}",
                    error_prefix,
                    stderr.trim()
                )))
            }
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StrategyError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(StrategyError::Io(e)),
    }
}

/// Check command status, returning appropriate error on failure.
pub fn check_cmd_status(
    result: std::io::Result<std::process::ExitStatus>,
    tool_name: &str,
    error_msg: &str,
) -> Result<(), StrategyError> {
    match result {
        Ok(s) if s.success() => Ok(()),
        Ok(_) => Err(StrategyError::Failed(error_msg.to_string())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(StrategyError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(StrategyError::Io(e)),
    }
}

/// Page count from `pdfinfo`, if it can be determined.
pub async fn pdf_page_count(file_path: &Path) -> Option<u32> {
    let output = Command::new("pdfinfo").arg(file_path).output().await.ok()?;

    if !output.status.success() {
        return None;
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
        .lines()
        .find(|line| line.starts_with("Pages:"))
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
}

/// Rasterise PDF pages to PNG files in `out_dir`, returning them in page order.
pub async fn render_pdf_pages(
    file_path: &Path,
    out_dir: &Path,
    dpi: u32,
    last_page: Option<u32>,
) -> Result<Vec<std::path::PathBuf>, StrategyError> {
    let mut cmd = Command::new("pdftoppm");
    cmd.args(["-png", "-r", &dpi.to_string()]);
    if let Some(last) = last_page {
        cmd.args(["-f", "1", "-l", &last.to_string()]);
    }
    let status = cmd.arg(file_path).arg(out_dir.join("page")).status().await;

    check_cmd_status(
        status,
        "pdftoppm (install poppler-utils)",
        "pdftoppm failed to convert PDF to images",
    )?;

    // pdftoppm names pages page-1.png or page-01.png depending on count.
    let mut pages: Vec<_> = std::fs::read_dir(out_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|e| e == "png"))
        .collect();
    pages.sort_by_key(|p| page_number(p));
    Ok(pages)
}

fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_tools() {
        let tools = check_tools();
        assert_eq!(tools.len(), EXTERNAL_TOOLS.len());
        for (tool, package, available) in tools {
            println!("{} ({}): {}", tool, package, if available { "found" } else { "missing" });
        }
    }

    #[test]
    fn test_page_number_ordering() {
        let mut pages = vec![
            std::path::PathBuf::from("/tmp/page-10.png"),
            std::path::PathBuf::from("/tmp/page-2.png"),
            std::path::PathBuf::from("/tmp/page-01.png"),
        ];
        pages.sort_by_key(|p| page_number(p));
        assert_eq!(pages[0].file_name().unwrap(), "page-01.png");
        assert_eq!(pages[2].file_name().unwrap(), "page-10.png");
    }

    #[test]
    fn test_missing_tool_is_reported() {
        let result = std::process::Command::new("blociq-no-such-tool").output();
        assert!(matches!(
            handle_cmd_output(result, "blociq-no-such-tool", "failed"),
            Err(StrategyError::ToolNotFound(_))
        ));
    }
}
