use crate::cli::commands::InitArgs;
use crate::io::project_io;
use crate::model::record::GroupField;

/// Validate a group-by field id: non-empty, no whitespace, no empty segments.
fn validate_group_by(id: &str) -> Result<(), String> {
    if id.is_empty() {
        return Err("group-by field cannot be empty".to_string());
    }
    if id.chars().any(char::is_whitespace) {
        return Err(format!("invalid group-by field \"{}\": no spaces allowed", id));
    }
    if id.split('.').any(str::is_empty) {
        return Err(format!("invalid group-by field \"{}\"", id));
    }
    Ok(())
}

/// Turn a directory name into a board name: "team-roadmap" -> "Team Roadmap"
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + &chars.collect::<String>()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let cwd = super::start_dir()?;

    validate_group_by(&args.group_by)?;
    if !GroupField::new(&args.group_by).is_writable() {
        eprintln!(
            "Note: \"{}\" is read-only; cards will not be movable between columns",
            args.group_by
        );
    }

    if let Some(parent) = cwd.parent()
        && let Ok(parent_root) = project_io::discover_board(parent)
    {
        eprintln!("Note: parent board found at {}/board/", parent_root.display());
    }

    let name = args.name.unwrap_or_else(|| {
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .unwrap_or_else(|| "Untitled".to_string())
    });

    let board_dir = project_io::init_board(&cwd, &name, &args.group_by, args.force)?;
    println!("Initialized board \"{}\" in {}/", name, board_dir.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_group_by() {
        assert!(validate_group_by("note.status").is_ok());
        assert!(validate_group_by("priority").is_ok());
        assert!(validate_group_by("file.folder").is_ok());
        assert!(validate_group_by("").is_err());
        assert!(validate_group_by("note status").is_err());
        assert!(validate_group_by("note.").is_err());
    }

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("team-roadmap"), "Team Roadmap");
        assert_eq!(infer_name("board"), "Board");
        assert_eq!(infer_name("q3_launch"), "Q3 Launch");
    }
}
