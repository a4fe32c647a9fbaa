use std::io::{self, BufRead, BufReader};

use tracing::info;
use vantage::{ENVIRONMENT_COMM_TARGET, EnvironmentSession, Value};
use vantage_comm::endpoint::{EnvironmentEndpoint, JsonLinesChannel};

fn main() -> io::Result<()> {
    // Diagnostics go to stderr; stdout carries only environment reports.
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    let mut endpoint = EnvironmentEndpoint::new();
    seed_demo_namespace(endpoint.session_mut());

    if let Err(error) = endpoint.connect(Box::new(JsonLinesChannel::new(io::stdout()))) {
        return Err(io::Error::other(error.to_string()));
    }
    info!("serving {ENVIRONMENT_COMM_TARGET} over stdio");

    let stdin = io::stdin();
    let mut reader = BufReader::new(stdin.lock());
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(());
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        endpoint.handle_line(trimmed);
    }
}

/// Fills the namespace with a few bindings so the endpoint has something to
/// report; a real host would feed it from its execution loop instead.
fn seed_demo_namespace(session: &mut EnvironmentSession) {
    session.mark_hidden("__builtins__");

    let ns = session.namespace_mut();
    ns.insert("greeting", Value::str("Hello"));
    ns.insert("counts", Value::List(vec![Value::Int(1), Value::Int(2), Value::Int(3)]));
    ns.insert("ratio", Value::Float(0.75));
    ns.insert(
        "double",
        Value::Function {
            qualname: "double".to_owned(),
            signature: "(n)".to_owned(),
        },
    );
    ns.insert("__builtins__", Value::None);
}
