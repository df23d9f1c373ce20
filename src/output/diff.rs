//! Diff output for dry-run manifest previews

use crate::manifest::ManifestPreview;
use std::io::Write;

/// Renders manifest previews as unified-style line diffs
pub struct DiffFormatter {
    /// Whether this is a dry-run
    dry_run: bool,
}

impl DiffFormatter {
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    fn dry_run_prefix(&self) -> &'static str {
        if self.dry_run {
            "(dry-run) "
        } else {
            ""
        }
    }

    /// Writes the changed lines of `preview`, one hunk per changed line
    pub fn format_preview(
        &self,
        preview: &ManifestPreview,
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        if !preview.is_changed() {
            return Ok(());
        }

        let prefix = self.dry_run_prefix();
        writeln!(writer, "{}--- a/{}", prefix, preview.path.display())?;
        writeln!(writer, "{}+++ b/{}", prefix, preview.path.display())?;

        let before: Vec<&str> = preview.before.lines().collect();
        let after: Vec<&str> = preview.after.lines().collect();
        let len = before.len().max(after.len());

        // Pin updates rewrite lines in place, so a positional comparison suffices
        for i in 0..len {
            let old = before.get(i).copied();
            let new = after.get(i).copied();
            if old == new {
                continue;
            }
            writeln!(writer, "@@ line {} @@", i + 1)?;
            if let Some(old) = old {
                writeln!(writer, "-{}", old)?;
            }
            if let Some(new) = new {
                writeln!(writer, "+{}", new)?;
            }
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn render(dry_run: bool, before: &str, after: &str) -> String {
        let preview = ManifestPreview {
            path: PathBuf::from("lvt/go.mod"),
            before: before.to_string(),
            after: after.to_string(),
        };
        let mut buf = Vec::new();
        DiffFormatter::new(dry_run)
            .format_preview(&preview, &mut buf)
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_changed_line() {
        let output = render(
            true,
            "module x\n\nrequire (\n\tgithub.com/a/b v0.1.0\n)\n",
            "module x\n\nrequire (\n\tgithub.com/a/b v0.2.0\n)\n",
        );
        assert_eq!(
            output,
            "(dry-run) --- a/lvt/go.mod\n\
             (dry-run) +++ b/lvt/go.mod\n\
             @@ line 4 @@\n\
             -\tgithub.com/a/b v0.1.0\n\
             +\tgithub.com/a/b v0.2.0\n\n"
        );
    }

    #[test]
    fn test_unchanged_preview_is_silent() {
        assert!(render(false, "module x\n", "module x\n").is_empty());
    }
}
