use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

fn root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn read(name: &str) -> String {
    fs::read_to_string(root().join(name)).unwrap_or_else(|e| panic!("read {}: {}", name, e))
}

/// Build-context sources of a `COPY` line. Stage copies are skipped.
fn copy_sources(line: &str) -> Option<Vec<String>> {
    let rest = line.trim().strip_prefix("COPY ")?;
    if rest.contains("--from=") {
        return None;
    }
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    Some(tokens[..tokens.len() - 1].iter().map(|s| s.trim_matches('"').to_string()).collect())
}

/// Variable names assigned in `.env.example`, commented ones included.
fn env_example_keys() -> HashSet<String> {
    read(".env.example")
        .lines()
        .map(|line| line.trim().trim_start_matches('#').trim())
        .filter_map(|line| line.split_once('='))
        .map(|(key, _)| key.trim().to_string())
        .filter(|key| !key.is_empty() && key.chars().all(|c| c.is_ascii_uppercase() || c == '_'))
        .collect()
}

#[test]
fn test_dockerfile_copy_sources_exist() {
    let dockerfile = read("Dockerfile");
    let mut missing = Vec::new();
    for (idx, line) in dockerfile.lines().enumerate() {
        let Some(sources) = copy_sources(line) else {
            continue;
        };
        for source in sources {
            if !root().join(Path::new(&source)).exists() {
                missing.push(format!("Dockerfile:{} -> {}", idx + 1, source));
            }
        }
    }
    assert!(missing.is_empty(), "missing COPY sources:\n{}", missing.join("\n"));
}

#[test]
fn test_dockerfile_ships_both_binaries() {
    let dockerfile = read("Dockerfile");
    assert!(dockerfile.contains("/usr/local/bin/linkedin_insights"));
    assert!(dockerfile.contains("/usr/local/bin/setup_db"));
    assert!(dockerfile.contains("EXPOSE 5000"));
}

#[test]
fn test_compose_wires_documented_variables() {
    let compose = read("docker-compose.yml");
    let documented = env_example_keys();

    for key in ["DB_HOST", "DB_USER", "DB_PASSWORD", "DB_NAME", "SECRET_KEY", "OPENAI_API_KEY"] {
        assert!(documented.contains(key), "{} is not in .env.example", key);
        assert!(compose.contains(&format!("{}:", key)), "{} is not passed to the app", key);
    }
    assert!(compose.contains("image: mysql"));
    assert!(compose.contains("DB_HOST: db"));
    assert!(compose.contains("setup_db"));
}
