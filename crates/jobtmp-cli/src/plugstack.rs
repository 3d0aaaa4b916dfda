//! Extraction of this plugin's arguments from a `plugstack.conf`.
//!
//! Each plugin line reads `required|optional <plugin path> [args...]`.
//! The first line whose plugin path names this plugin wins.

use jobtmp_common::constants::PLUGIN_NAME;

/// Returns the arguments on the plugin's line, or `None` if no line names it.
pub fn plugin_args(contents: &str) -> Option<Vec<String>> {
    contents
        .lines()
        .map(|line| line.split('#').next().unwrap_or_default())
        .find_map(|line| {
            let mut tokens = line.split_whitespace();
            match tokens.next()? {
                "required" | "optional" => {}
                _ => return None,
            }
            let plugin = tokens.next()?;
            let file = plugin.rsplit('/').next().unwrap_or(plugin);
            if !file.starts_with(PLUGIN_NAME) {
                return None;
            }
            Some(tokens.map(str::to_owned).collect())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_plugin_line_among_others() {
        let conf = "\
# site plugins
optional /usr/lib64/slurm/other.so flag=1
required /usr/lib64/slurm/private-tmpdir.so base=/tmp/slurm mount=/var/tmp mount=/tmp
";
        assert_eq!(
            plugin_args(conf),
            Some(vec![
                "base=/tmp/slurm".to_string(),
                "mount=/var/tmp".to_string(),
                "mount=/tmp".to_string(),
            ])
        );
    }

    #[test]
    fn relative_plugin_path_and_trailing_comment() {
        let conf = "optional private-tmpdir.so mount=/tmp # per-job tmp\n";
        assert_eq!(plugin_args(conf), Some(vec!["mount=/tmp".to_string()]));
    }

    #[test]
    fn plugin_without_arguments_yields_empty_list() {
        assert_eq!(plugin_args("required private-tmpdir.so"), Some(Vec::new()));
    }

    #[test]
    fn commented_out_line_is_ignored() {
        assert_eq!(plugin_args("#required private-tmpdir.so mount=/tmp"), None);
    }

    #[test]
    fn include_lines_are_ignored() {
        assert_eq!(plugin_args("include /etc/slurm/plugstack.conf.d/*"), None);
    }
}
