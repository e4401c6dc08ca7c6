pub mod trace {
    use colored::Colorize;
    use regex::Regex;
    use std::io::Write;
    use std::thread;
    use std::time::Instant;

    const THREAD_ID_REGEX_STR: &str = "ThreadId\\(([[:digit:]]+)\\)";

    /// Installs the global logger. `maybe_filter` is a regex with one capture
    /// group; records whose target it does not capture are shown as
    /// `<target>`. Later calls are no-ops.
    pub fn init(maybe_filter: Option<String>) {
        let launch_time = Instant::now();
        let target_regex_str = maybe_filter.unwrap_or_else(|| "(.*)".to_string());
        let target_regex = match Regex::new(target_regex_str.as_str()) {
            Ok(regex) => regex,
            Err(err) => {
                eprintln!("Invalid trace filter '{}': {}", target_regex_str, err);
                return;
            }
        };
        let thread_id_regex = Regex::new(THREAD_ID_REGEX_STR).unwrap();

        let mut binding = env_logger::builder();
        let builder = binding.format(move |buf, record| {
            let target_str = record.target();
            let mut results = vec![];
            for (_, [target]) in target_regex.captures_iter(target_str).map(|c| c.extract()) {
                results.push(target);
            }

            let target_str = match results.as_slice() {
                [target] => *target,
                _ => return writeln!(buf, "<target> {}", record.args()),
            };

            let thread_id_str = format!("{:?}", thread::current().id());
            let thread_id_str = thread_id_regex
                .captures(thread_id_str.as_str())
                .and_then(|c| c.get(1))
                .map(|id| id.as_str().to_string())
                .unwrap_or_default();

            let elapsed = launch_time.elapsed().as_millis() as f32 / 1000.;

            writeln!(
                buf,
                "{:<8}{:<4}{:<6}{:<15}{}",
                elapsed.to_string().blue().bold(),
                thread_id_str.green().bold(),
                record.level().to_string().yellow(),
                target_str.red().bold(),
                record.args(),
            )
        });
        let _ = builder.try_init();
    }
}
