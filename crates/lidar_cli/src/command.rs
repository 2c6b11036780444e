//! Shell command parsing.

/// One parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
  Exit,
  Help,
  /// Toggle per-stage timing collection.
  Chrono(bool),
  DefineBackground,
  /// Characterize an object and store it under the given name.
  DefineObject(String),
  /// `set <param> <value>`.
  Set(String, String),
  /// Discard incoming points for the given window (ms).
  Discard(u64),
  /// Print one stored object.
  Object(String),
  /// Promote a stored object to a model: `model add <name> <object>`.
  ModelAdd(String, String),
  /// Print one stored model.
  Model(String),
  Info,
  List,
  /// `analyze <object> <model>`.
  Analyze(String, String),
  Unknown,
}

impl ShellCommand {
  /// Tokenize on whitespace and match the leading keyword. Anything that
  /// does not fit a known shape parses as `Unknown`.
  pub fn parse(input: &str) -> ShellCommand {
    let tokens: Vec<&str> = input.split_whitespace().collect();
    let Some(&head) = tokens.first() else {
      return ShellCommand::Unknown;
    };

    match (head, &tokens[1..]) {
      ("exit", []) => ShellCommand::Exit,
      ("help", []) => ShellCommand::Help,
      ("chrono", ["on"]) => ShellCommand::Chrono(true),
      ("chrono", ["off"]) => ShellCommand::Chrono(false),
      ("define", ["background"]) => ShellCommand::DefineBackground,
      ("define", ["object", name]) => ShellCommand::DefineObject(name.to_string()),
      ("set", [param, value]) => ShellCommand::Set(param.to_string(), value.to_string()),
      ("discard", [ms]) => match ms.parse() {
        Ok(ms) => ShellCommand::Discard(ms),
        Err(_) => ShellCommand::Unknown,
      },
      ("object", [name]) => ShellCommand::Object(name.to_string()),
      ("model", ["add", name, object]) => {
        ShellCommand::ModelAdd(name.to_string(), object.to_string())
      }
      ("model", [name]) => ShellCommand::Model(name.to_string()),
      ("info", []) => ShellCommand::Info,
      ("list", []) => ShellCommand::List,
      ("analyze", [object, model]) => {
        ShellCommand::Analyze(object.to_string(), model.to_string())
      }
      _ => ShellCommand::Unknown,
    }
  }
}

pub const HELP_TEXT: &str = "\
Commands:
  define background          capture the background frame
  define object <name>       characterize an object and store it
  discard <ms>               drop incoming points for a window
  set <param> <value>        objframe | backframe | reflectivity | backdistance
  chrono on|off              toggle stage timing logs
  object <name>              show a stored object
  model add <name> <object>  promote a stored object to a model
  model <name>               show a stored model
  analyze <object> <model>   compare an object against a model
  list                       list stored objects and models
  info                       show current parameters
  help                       this text
  exit";
