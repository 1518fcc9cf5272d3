use clap::{Arg, CommandFactory};
use serde::Serialize;

use crate::Cli;

#[derive(Debug, Serialize)]
pub struct HelpSchema {
    pub n: String,
    pub d: String,
    pub u: String,
    pub a: Vec<Flag>,
    pub f: Vec<Flag>,
    pub e: Vec<String>,
    pub x: Vec<ExitCode>,
}

#[derive(Debug, Serialize)]
pub struct Flag {
    pub name: String,
    pub short: Option<String>,
    pub r#type: String,
    pub default: Option<String>,
    pub required: bool,
    pub r#enum: Option<Vec<String>>,
    pub desc: String,
}

#[derive(Debug, Serialize)]
pub struct ExitCode {
    pub code: i32,
    pub meaning: String,
}

pub fn schema() -> HelpSchema {
    let mut cmd = Cli::command();
    cmd.build();
    let (positional, flags): (Vec<&Arg>, Vec<&Arg>) = cmd
        .get_arguments()
        .filter(|a| !matches!(a.get_id().as_str(), "help" | "version"))
        .partition(|a| a.is_positional());

    HelpSchema {
        n: cmd.get_name().to_string(),
        d: cmd.get_about().map(|s| s.to_string()).unwrap_or_default(),
        u: "unused-styles [OPTIONS] [FOLDERS]...".to_string(),
        a: positional.into_iter().map(flag).collect(),
        f: flags.into_iter().map(flag).collect(),
        e: vec![
            "unused-styles app".into(),
            "unused-styles app lib --format ai".into(),
            "unused-styles app --remove".into(),
            "unused-styles --remove-json unused-styles.json".into(),
        ],
        x: vec![
            ExitCode {
                code: 0,
                meaning: "Success".into(),
            },
            ExitCode {
                code: 1,
                meaning: "I/O failure, invalid config or malformed report".into(),
            },
            ExitCode {
                code: 2,
                meaning: "Invalid CLI usage".into(),
            },
        ],
    }
}

fn flag(arg: &Arg) -> Flag {
    let takes_value = arg.get_action().takes_values();
    let choices: Vec<String> = arg
        .get_possible_values()
        .iter()
        .map(|v| v.get_name().to_string())
        .collect();
    let default = arg
        .get_default_values()
        .first()
        .map(|v| v.to_string_lossy().into_owned());

    Flag {
        name: arg
            .get_long()
            .map(str::to_string)
            .unwrap_or_else(|| arg.get_id().to_string()),
        short: arg.get_short().map(|c| c.to_string()),
        r#type: if !takes_value {
            "bool".into()
        } else if !choices.is_empty() {
            "string".into()
        } else if arg.is_positional() {
            "path[]".into()
        } else {
            "path".into()
        },
        default,
        required: arg.is_required_set(),
        r#enum: if choices.is_empty() { None } else { Some(choices) },
        desc: arg.get_help().map(|s| s.to_string()).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::schema;

    #[test]
    fn keys_serialize_in_fixed_order() {
        let json = serde_json::to_string(&schema()).expect("serialize");
        let idx_n = json.find("\"n\"").expect("n");
        let idx_d = json.find("\"d\"").expect("d");
        let idx_u = json.find("\"u\"").expect("u");
        assert!(idx_n < idx_d && idx_d < idx_u);
    }

    #[test]
    fn flags_mirror_cli_definition() {
        let s = schema();
        assert_eq!(s.n, "unused-styles");
        let names: Vec<&str> = s.f.iter().map(|f| f.name.as_str()).collect();
        assert!(names.contains(&"remove"));
        assert!(names.contains(&"remove-json"));
        let format = s.f.iter().find(|f| f.name == "format").expect("format");
        assert_eq!(format.r#enum.as_deref(), Some(&["human".to_string(), "ai".to_string()][..]));
        assert_eq!(s.a.len(), 1);
        assert_eq!(s.a[0].name, "folders");
        let remove = s.f.iter().find(|f| f.name == "remove").expect("remove");
        assert_eq!(remove.r#type, "bool");
    }
}
