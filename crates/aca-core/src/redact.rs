/// Flags whose following value is a credential.
const SECRET_FLAGS: &[&str] = &["--password", "--registry-password", "-p"];

/// Copy of `args` safe to log: values following credential flags become `***`.
///
/// # Examples
///
/// ```
/// use aca_core::redact::redact_args;
///
/// let args: Vec<String> = ["login", "-u", "me", "-p", "hunter2"].map(String::from).to_vec();
/// assert_eq!(redact_args(&args), ["login", "-u", "me", "-p", "***"]);
/// ```
pub fn redact_args(args: &[String]) -> Vec<String> {
    let mut redacted = Vec::with_capacity(args.len());
    let mut hide_next = false;

    for arg in args {
        if hide_next {
            redacted.push("***".to_owned());
        } else {
            redacted.push(arg.clone());
        }
        hide_next = SECRET_FLAGS.contains(&arg.as_str());
    }

    redacted
}
