use std::io::{self, Write};

use crate::cmd::Result;

/// Pretty-print a serializable payload to stdout.
pub(crate) fn emit_json<T: serde::Serialize>(payload: &T) -> Result<()> {
	let mut stdout = io::stdout().lock();
	serde_json::to_writer_pretty(&mut stdout, payload)?;
	writeln!(stdout)?;
	Ok(())
}

/// Render a double the way script engines print it.
pub(crate) fn number_label(value: f64) -> String {
	if value.is_nan() {
		"NaN".to_owned()
	} else if value.is_infinite() {
		if value > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
	} else if value == 0.0 && value.is_sign_negative() {
		"-0".to_owned()
	} else {
		format!("{value}")
	}
}
