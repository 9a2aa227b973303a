//! Parsing of demo input lines.

use anyhow::{anyhow, bail, Context, Result};

use nudge_core::ConditionScope;

/// Conversation shown on the demo phone.
pub const MAIN_ROOM: &str = "main";

/// Rooms registered at startup: id and display name.
pub const ROOMS: [(&str, &str); 6] = [
    (MAIN_ROOM, "상대방"),
    ("group1", "가족방"),
    ("friend1", "김철수"),
    ("group2", "회사 동료들"),
    ("friend2", "박영희"),
    ("friend3", "이민수"),
];

/// Condition operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionOp {
    Add(String),
    /// 1-based position in the scope's list.
    Remove(usize),
    Edit(usize, String),
    List,
}

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DemoCommand {
    Send { room: String, text: String },
    Open(String),
    Recheck(String),
    Power,
    Activate(usize),
    Dismiss(usize),
    Condition { scope: ConditionScope, op: ConditionOp },
    Sensitivity { scope: ConditionScope, value: i64 },
    General(bool),
    Matching { scope: ConditionScope, enabled: bool },
    Status(String),
    Rooms,
    Help,
    Quit,
}

pub const HELP: &str = "\
  <text>                       message to the main conversation
  /say <room> <text>           message to another room
  /open [room]                 open (read) a conversation
  /recheck [room]              classify the unread messages again
  /power                       toggle the screen
  /activate <n>, /dismiss <n>  act on the n-th visible notification
  /cond add|rm|edit|list [global] ...
  /sens [global] <0-100>       set sensitivity
  /general on|off              new-message notifications for main
  /match [global] on|off       condition matching
  /status [room], /rooms, /help, /quit";

/// Parse one input line; `None` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<DemoCommand>> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Some(DemoCommand::Send {
            room: MAIN_ROOM.to_string(),
            text: line.to_string(),
        }));
    };

    let (name, args) = split_word(rest);
    let command = match name {
        "say" => {
            let (room, text) = split_word(args);
            if room.is_empty() || text.is_empty() {
                bail!("usage: /say <room> <text>");
            }
            DemoCommand::Send {
                room: room.to_string(),
                text: text.to_string(),
            }
        }
        "open" => DemoCommand::Open(room_or_main(args)),
        "recheck" => DemoCommand::Recheck(room_or_main(args)),
        "power" => DemoCommand::Power,
        "activate" => DemoCommand::Activate(position(args)?),
        "dismiss" => DemoCommand::Dismiss(position(args)?),
        "cond" => parse_condition(args)?,
        "sens" => {
            let (scope, args) = scope_of(args);
            let value = args
                .parse()
                .with_context(|| format!("not a sensitivity: '{}'", args))?;
            DemoCommand::Sensitivity { scope, value }
        }
        "general" => DemoCommand::General(switch(args)?),
        "match" => {
            let (scope, args) = scope_of(args);
            DemoCommand::Matching {
                scope,
                enabled: switch(args)?,
            }
        }
        "status" => DemoCommand::Status(room_or_main(args)),
        "rooms" => DemoCommand::Rooms,
        "help" => DemoCommand::Help,
        "quit" | "exit" => DemoCommand::Quit,
        other => bail!("unknown command '/{}', try /help", other),
    };
    Ok(Some(command))
}

fn parse_condition(args: &str) -> Result<DemoCommand> {
    let (op, args) = split_word(args);
    let (scope, args) = scope_of(args);
    let op = match op {
        "add" if !args.is_empty() => ConditionOp::Add(args.to_string()),
        "rm" => ConditionOp::Remove(position(args)?),
        "edit" => {
            let (n, text) = split_word(args);
            if text.is_empty() {
                bail!("usage: /cond edit [global] <n> <text>");
            }
            ConditionOp::Edit(position(n)?, text.to_string())
        }
        "list" => ConditionOp::List,
        _ => bail!("usage: /cond add|rm|edit|list [global] ..."),
    };
    Ok(DemoCommand::Condition { scope, op })
}

fn split_word(s: &str) -> (&str, &str) {
    let s = s.trim();
    match s.split_once(char::is_whitespace) {
        Some((head, tail)) => (head, tail.trim()),
        None => (s, ""),
    }
}

fn scope_of(args: &str) -> (ConditionScope, &str) {
    match split_word(args) {
        ("global", rest) => (ConditionScope::Global, rest),
        _ => (ConditionScope::conversation(MAIN_ROOM), args.trim()),
    }
}

fn room_or_main(args: &str) -> String {
    match args.trim() {
        "" => MAIN_ROOM.to_string(),
        room => room.to_string(),
    }
}

fn position(args: &str) -> Result<usize> {
    match args.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(anyhow!("expected a position starting at 1, got '{}'", args.trim())),
    }
}

fn switch(args: &str) -> Result<bool> {
    match args.trim() {
        "on" => Ok(true),
        "off" => Ok(false),
        other => bail!("expected on or off, got '{}'", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> DemoCommand {
        parse_line(line).unwrap().unwrap()
    }

    #[test]
    fn test_plain_text_goes_to_main() {
        assert_eq!(
            parse("  다음 달에 해외여행 갈래? "),
            DemoCommand::Send {
                room: "main".to_string(),
                text: "다음 달에 해외여행 갈래?".to_string(),
            }
        );
        assert!(parse_line("   ").unwrap().is_none());
    }

    #[test]
    fn test_say_to_room() {
        assert_eq!(
            parse("/say group1 저녁 뭐 먹어?"),
            DemoCommand::Send {
                room: "group1".to_string(),
                text: "저녁 뭐 먹어?".to_string(),
            }
        );
        assert!(parse_line("/say group1").is_err());
    }

    #[test]
    fn test_condition_commands() {
        assert_eq!(
            parse("/cond add 여행 계획"),
            DemoCommand::Condition {
                scope: ConditionScope::conversation("main"),
                op: ConditionOp::Add("여행 계획".to_string()),
            }
        );
        assert_eq!(
            parse("/cond rm global 2"),
            DemoCommand::Condition {
                scope: ConditionScope::Global,
                op: ConditionOp::Remove(2),
            }
        );
        assert_eq!(
            parse("/cond edit 1 맛집 추천"),
            DemoCommand::Condition {
                scope: ConditionScope::conversation("main"),
                op: ConditionOp::Edit(1, "맛집 추천".to_string()),
            }
        );
        assert!(parse_line("/cond add").is_err());
        assert!(parse_line("/cond rm 0").is_err());
    }

    #[test]
    fn test_settings() {
        assert_eq!(
            parse("/sens global 80"),
            DemoCommand::Sensitivity {
                scope: ConditionScope::Global,
                value: 80,
            }
        );
        // Range is checked by the engine
        assert_eq!(
            parse("/sens 150"),
            DemoCommand::Sensitivity {
                scope: ConditionScope::conversation("main"),
                value: 150,
            }
        );
        assert_eq!(parse("/general off"), DemoCommand::General(false));
        assert_eq!(
            parse("/match global on"),
            DemoCommand::Matching {
                scope: ConditionScope::Global,
                enabled: true,
            }
        );
        assert!(parse_line("/match maybe").is_err());
    }

    #[test]
    fn test_misc() {
        assert_eq!(parse("/open"), DemoCommand::Open("main".to_string()));
        assert_eq!(parse("/status friend1"), DemoCommand::Status("friend1".to_string()));
        assert_eq!(parse("/recheck"), DemoCommand::Recheck(MAIN_ROOM.to_string()));
        assert_eq!(parse("/activate 1"), DemoCommand::Activate(1));
        assert!(parse_line("/teleport").is_err());
    }
}
