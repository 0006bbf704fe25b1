use crate::config::Config;
use crate::error::Result;
use crate::manifest::{ManifestLoader, ManifestTree};
use std::fmt::Write;

/// 按文件与分节列出依赖
pub fn render_listing(tree: &ManifestTree) -> String {
    let mut out = String::new();

    for loaded in &tree.manifests {
        let manifest = &loaded.manifest;
        let indent = "  ".repeat(loaded.depth);
        let via = match (&loaded.kind, &loaded.included_from) {
            (Some(kind), Some((from, line))) => {
                format!(" (via {} at {}:{line})", kind.flag(), from.display())
            }
            _ => String::new(),
        };
        let _ = writeln!(out, "{indent}{}{via}", manifest.path().display());

        let mut current_section = None;
        for (line, req) in manifest.requirements() {
            if line.section != current_section {
                current_section = line.section;
                if let Some(title) = manifest.section_title(line) {
                    let _ = writeln!(out, "{indent}  [{title}]");
                }
            }
            let state = if req.is_pinned() { "pinned" } else { "unpinned" };
            let _ = writeln!(out, "{indent}    {req}  ({state})");
        }
    }

    out
}

pub fn handle_list(cfg: &Config) -> Result<()> {
    let loader = ManifestLoader::new(cfg.manifest.max_include_depth);
    for path in cfg.manifest.paths() {
        let tree = loader.load(path)?;
        print!("{}", render_listing(&tree));
    }
    Ok(())
}
