use storyloom::Language;
use storyloom::command::{Command, CommandError};

fn parse(line: &str) -> Result<Command, CommandError> {
    line.parse()
}

#[test]
fn test_simple_commands() {
    assert_eq!(parse("help"), Ok(Command::Help));
    assert_eq!(parse("?"), Ok(Command::Help));
    assert_eq!(parse("ls"), Ok(Command::Templates));
    assert_eq!(parse("  GENERATE  "), Ok(Command::Generate));
    assert_eq!(parse("board"), Ok(Command::Board));
    assert_eq!(parse("exit"), Ok(Command::Quit));
}

#[test]
fn test_empty_and_unknown() {
    assert_eq!(parse("   "), Err(CommandError::Empty));
    assert_eq!(
        parse("dance now"),
        Err(CommandError::Unknown("dance".to_string()))
    );
}

#[test]
fn test_arguments_keep_their_text() {
    assert_eq!(
        parse("topic A knight who is afraid of the dark"),
        Ok(Command::Topic("A knight who is afraid of the dark".to_string()))
    );
    assert_eq!(parse("edit 2"), Ok(Command::Edit("2".to_string())));
    assert_eq!(parse("rm 3"), Ok(Command::Delete("3".to_string())));
}

#[test]
fn test_missing_arguments() {
    assert_eq!(parse("edit"), Err(CommandError::MissingArgument("template")));
    assert_eq!(parse("topic"), Err(CommandError::MissingArgument("topic")));
    assert_eq!(parse("set"), Err(CommandError::MissingArgument("variable")));
}

#[test]
fn test_select() {
    assert_eq!(parse("select 1"), Ok(Command::Select(Some("1".to_string()))));
    assert_eq!(parse("select none"), Ok(Command::Select(None)));
}

#[test]
fn test_set_binds_rest_of_line() {
    assert_eq!(
        parse("set hero  a brave  robot "),
        Ok(Command::Set("hero".to_string(), "a brave  robot".to_string()))
    );
    assert_eq!(
        parse("set hero"),
        Ok(Command::Set("hero".to_string(), String::new()))
    );
}

#[test]
fn test_content_and_write_unescape_line_breaks() {
    assert_eq!(
        parse(r"content First line\nSecond {{x}}"),
        Ok(Command::Content("First line\nSecond {{x}}".to_string()))
    );
    assert_eq!(
        parse(r"write Para one.\n\nPara two."),
        Ok(Command::Write("Para one.\n\nPara two.".to_string()))
    );
    assert_eq!(parse("write"), Ok(Command::Write(String::new())));
}

#[test]
fn test_image_numbers_are_one_based() {
    assert_eq!(parse("image 1"), Ok(Command::Image(0)));
    assert_eq!(parse("image 12"), Ok(Command::Image(11)));
    assert_eq!(
        parse("image 0"),
        Err(CommandError::InvalidArgument("scene number", "0".to_string()))
    );
    assert_eq!(
        parse("image first"),
        Err(CommandError::InvalidArgument(
            "scene number",
            "first".to_string()
        ))
    );
}

#[test]
fn test_language() {
    assert_eq!(parse("lang zh"), Ok(Command::Lang(Language::Zh)));
    assert_eq!(parse("lang EN"), Ok(Command::Lang(Language::En)));
    assert_eq!(
        parse("lang fr"),
        Err(CommandError::InvalidArgument("language", "fr".to_string()))
    );
}
