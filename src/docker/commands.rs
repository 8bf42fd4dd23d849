//! Pure builders for docker argument lists, plus `docker ps` parsing

use super::types::{ContainerSpec, ContainerStatus};

/// Env keys whose values never reach the logs.
const SECRET_MARKERS: [&str; 3] = ["PASSWORD", "ENCRYPTIONKEY", "TOKEN"];

/// `docker version`, used as a daemon liveness check.
pub fn version() -> Vec<String> {
    vec![
        "version".into(),
        "--format".into(),
        "{{.Server.Version}}".into(),
    ]
}

/// Build `docker pull <image>`.
pub fn pull(image: &str) -> Vec<String> {
    vec!["pull".into(), image.to_string()]
}

/// Build `docker network create <name>`.
pub fn network_create(name: &str) -> Vec<String> {
    vec!["network".into(), "create".into(), name.to_string()]
}

/// List networks whose name is exactly `name`.
pub fn network_ls(name: &str) -> Vec<String> {
    vec![
        "network".into(),
        "ls".into(),
        "--filter".into(),
        format!("name=^{name}$"),
        "--format".into(),
        "{{.Name}}".into(),
    ]
}

/// Build `docker network rm <name>`.
pub fn network_rm(name: &str) -> Vec<String> {
    vec!["network".into(), "rm".into(), name.to_string()]
}

/// Build a detached `docker run` for a container spec.
pub fn run_detached(spec: &ContainerSpec) -> Vec<String> {
    let mut args = vec![
        "run".into(),
        "-d".into(),
        "--name".into(),
        spec.name.clone(),
        "--network".into(),
        spec.network.clone(),
    ];
    for binding in &spec.ports {
        args.push("-p".into());
        args.push(binding.as_arg());
    }
    for (key, value) in &spec.env {
        args.push("-e".into());
        args.push(format!("{key}={value}"));
    }
    args.push(spec.image.clone());
    args
}

/// Build `docker stop <name>`.
pub fn stop(name: &str) -> Vec<String> {
    vec!["stop".into(), name.to_string()]
}

/// Build `docker rm <name>`.
pub fn rm(name: &str) -> Vec<String> {
    vec!["rm".into(), name.to_string()]
}

/// Build `docker restart <names...>`.
pub fn restart(names: &[&str]) -> Vec<String> {
    let mut args = vec!["restart".to_string()];
    args.extend(names.iter().map(|n| n.to_string()));
    args
}

/// List containers (running or not) matching any of `names`, one JSON object per line.
pub fn ps(names: &[&str]) -> Vec<String> {
    let mut args = vec!["ps".to_string(), "-a".to_string()];
    for name in names {
        args.push("--filter".into());
        args.push(format!("name={name}"));
    }
    args.push("--format".into());
    args.push("{{json .}}".into());
    args
}

/// Parse `docker ps --format '{{json .}}'` output, keeping exact name matches only.
///
/// `--filter name=` is a substring match, so `kibana` would also match
/// `kibana-old`; the caller's names are the source of truth.
pub fn parse_ps_output(output: &str, names: &[&str]) -> Vec<ContainerStatus> {
    let mut rows: Vec<ContainerStatus> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<ContainerStatus>(line) {
            Ok(row) => Some(row),
            Err(e) => {
                tracing::debug!(line, error = %e, "skipping unparsable docker ps line");
                None
            }
        })
        .filter(|row| names.contains(&row.name.as_str()))
        .collect();

    rows.sort_by_key(|row| {
        names
            .iter()
            .position(|n| *n == row.name)
            .unwrap_or(usize::MAX)
    });
    rows
}

/// Render a docker invocation for logs with secret env values masked.
pub fn display_command(args: &[String]) -> String {
    let mut rendered = Vec::with_capacity(args.len() + 1);
    rendered.push("docker".to_string());

    let mut after_env_flag = false;
    for arg in args {
        if after_env_flag {
            rendered.push(mask_env(arg));
        } else {
            rendered.push(arg.clone());
        }
        after_env_flag = arg == "-e";
    }
    rendered.join(" ")
}

fn mask_env(assignment: &str) -> String {
    match assignment.split_once('=') {
        Some((key, _)) if is_secret(key) => format!("{key}=***"),
        _ => assignment.to_string(),
    }
}

fn is_secret(key: &str) -> bool {
    let normalized: String = key
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_uppercase();
    SECRET_MARKERS.iter().any(|m| normalized.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docker::types::PortBinding;

    fn spec() -> ContainerSpec {
        ContainerSpec {
            name: "elasticsearch".into(),
            image: "docker.elastic.co/elasticsearch/elasticsearch:7.17.9".into(),
            network: "elastic".into(),
            env: vec![
                ("discovery.type".into(), "single-node".into()),
                ("ELASTIC_PASSWORD".into(), "changeme".into()),
            ],
            ports: vec![PortBinding::same(9200), PortBinding::same(9300)],
        }
    }

    #[test]
    fn test_run_detached_builds_correct_args() {
        let args = run_detached(&spec());
        assert_eq!(&args[..2], &["run".to_string(), "-d".to_string()]);
        assert!(args.windows(2).any(|w| w == ["--name", "elasticsearch"]));
        assert!(args.windows(2).any(|w| w == ["--network", "elastic"]));
        assert!(args.windows(2).any(|w| w == ["-p", "9200:9200"]));
        assert!(args.windows(2).any(|w| w == ["-p", "9300:9300"]));
        assert!(args
            .windows(2)
            .any(|w| w == ["-e", "discovery.type=single-node"]));
        // Image comes last, after every option.
        assert_eq!(args.last().unwrap(), &spec().image);
    }

    #[test]
    fn test_network_ls_is_exact_match() {
        let args = network_ls("elastic");
        assert!(args.contains(&"name=^elastic$".to_string()));
    }

    #[test]
    fn test_ps_filters_each_name() {
        let args = ps(&["elasticsearch", "kibana"]);
        assert_eq!(&args[..2], &["ps".to_string(), "-a".to_string()]);
        assert!(args.contains(&"name=elasticsearch".to_string()));
        assert!(args.contains(&"name=kibana".to_string()));
        assert_eq!(args.last().unwrap(), "{{json .}}");
    }

    #[test]
    fn test_restart_takes_all_names() {
        assert_eq!(
            restart(&["a", "b"]),
            vec!["restart".to_string(), "a".to_string(), "b".to_string()]
        );
    }

    #[test]
    fn test_parse_ps_keeps_exact_names_in_order() {
        let output = concat!(
            r#"{"Names":"kibana-old","State":"exited","Status":"Exited (0)"}"#,
            "\n",
            r#"{"Names":"kibana","State":"running","Status":"Up 1 minute"}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"Names":"elasticsearch","State":"running","Status":"Up 2 minutes"}"#,
            "\n",
        );
        let rows = parse_ps_output(output, &["elasticsearch", "kibana", "fleet-server"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "elasticsearch");
        assert_eq!(rows[1].name, "kibana");
    }

    #[test]
    fn test_parse_ps_empty_output() {
        assert!(parse_ps_output("", &["kibana"]).is_empty());
    }

    #[test]
    fn test_display_command_masks_secrets() {
        let mut s = spec();
        s.env.push((
            "XPACK_ENCRYPTEDSAVEDOBJECTS_ENCRYPTIONKEY".into(),
            "0123456789abcdef0123456789abcdef".into(),
        ));
        let shown = display_command(&run_detached(&s));
        assert!(shown.starts_with("docker run -d"));
        assert!(shown.contains("ELASTIC_PASSWORD=***"));
        assert!(!shown.contains("changeme"));
        assert!(!shown.contains("0123456789abcdef"));
        assert!(shown.contains("discovery.type=single-node"));
    }
}
