//! Embedded configuration templates and their renderers.
//!
//! Template sources live in the workspace `templates/` directory and are
//! embedded at compile time with `rust-embed`; rendering uses `tera`.

use rust_embed::RustEmbed;
use tera::{Context, Tera};
use thiserror::Error;

pub const USERDATA_TEMPLATE: &str = "userdata.yaml";
pub const CHARMCONF_TEMPLATE: &str = "charmconf.yaml";
pub const JUJU_ENV_TEMPLATE: &str = "juju-env/single.yaml";

/// Embedded template files.
///
/// `CARGO_MANIFEST_DIR` is `crates/core`, so `../../templates` is the
/// workspace-level `templates/` directory.
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../templates"]
pub struct TemplateAssets;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Template not embedded: {0}")]
    NotFound(String),

    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: tera::Error,
    },
}

pub type TemplateResult<T> = Result<T, TemplateError>;

/// Get template file content by path relative to `templates/`.
pub fn get_template(path: &str) -> Option<String> {
    TemplateAssets::get(path).map(|file| String::from_utf8_lossy(file.data.as_ref()).to_string())
}

fn render(name: &str, context: &Context) -> TemplateResult<String> {
    let source = get_template(name).ok_or_else(|| TemplateError::NotFound(name.to_string()))?;
    Tera::one_off(&source, context, false).map_err(|source| TemplateError::Render {
        name: name.to_string(),
        source,
    })
}

/// Full `ppa:` source for an extra archive, accepting the name with or
/// without its `ppa:` prefix.
fn ppa_source(extra_ppa: &str) -> String {
    format!("ppa:{}", extra_ppa.strip_prefix("ppa:").unwrap_or(extra_ppa))
}

/// Render the container's cloud-init user data.
///
/// Operator-supplied values are emitted as quoted scalars.
pub fn render_userdata(
    ssh_keys: &[String],
    packages: &[&str],
    extra_ppa: Option<&str>,
) -> TemplateResult<String> {
    let mut context = Context::new();
    context.insert("extra_sshkeys", ssh_keys);
    context.insert("extra_pkgs", packages);
    context.insert("extra_ppa", &extra_ppa.map(ppa_source));
    tracing::debug!(?ssh_keys, ?packages, ?extra_ppa, "userdata options");
    render(USERDATA_TEMPLATE, &context)
}

/// Render charm configuration with the OpenStack admin password.
pub fn render_charmconf(openstack_password: &str) -> TemplateResult<String> {
    let mut context = Context::new();
    context.insert("openstack_password", openstack_password);
    render(CHARMCONF_TEMPLATE, &context)
}

/// Render the Juju environments file for a single-node install.
pub fn render_juju_env(openstack_password: &str) -> TemplateResult<String> {
    let mut context = Context::new();
    context.insert("openstack_password", openstack_password);
    render(JUJU_ENV_TEMPLATE, &context)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_templates_embedded() {
        for name in [USERDATA_TEMPLATE, CHARMCONF_TEMPLATE, JUJU_ENV_TEMPLATE] {
            assert!(get_template(name).is_some(), "{} should be embedded", name);
        }
        assert!(get_template("missing.yaml").is_none());
    }

    #[test]
    fn test_render_userdata_without_ppa() {
        let keys = vec!["ssh-rsa AAAA tester@host".to_string()];
        let rendered = render_userdata(&keys, &["juju-local"], None).expect("render userdata");

        assert!(rendered.starts_with("#cloud-config"));
        assert!(rendered.contains("  - \"ssh-rsa AAAA tester@host\""));
        assert!(rendered.contains("  - \"juju-local\""));
        assert!(!rendered.contains("apt_sources"));
    }

    #[test]
    fn test_render_userdata_with_ppa() {
        let keys = vec!["ssh-rsa AAAA tester@host".to_string()];
        let rendered = render_userdata(&keys, &["juju-local"], Some("cloud-installer/testing"))
            .expect("render userdata");

        assert!(rendered.contains("apt_sources:"));
        assert!(rendered.contains("ppa:cloud-installer/testing"));
    }

    #[test]
    fn test_rendered_userdata_is_valid_yaml() {
        let keys = vec!["ssh-rsa AAAA tester@host".to_string()];
        let rendered = render_userdata(&keys, &["juju-local"], Some("cloud-installer/testing"))
            .expect("render userdata");

        let value: serde_yaml::Value = serde_yaml::from_str(&rendered).expect("valid yaml");
        assert_eq!(value["packages"][0].as_str(), Some("juju-local"));
        assert_eq!(
            value["ssh_authorized_keys"][0].as_str(),
            Some("ssh-rsa AAAA tester@host")
        );
    }

    #[test]
    fn test_render_password_templates() {
        let charmconf = render_charmconf("s3cret").expect("render charmconf");
        assert!(charmconf.contains("admin-password: \"s3cret\""));

        let env = render_juju_env("s3cret").expect("render juju env");
        assert!(env.contains("admin-secret: \"s3cret\""));
        assert!(env.contains("default: local"));
    }

    #[test]
    fn test_password_with_yaml_syntax_survives_parse() {
        for password in ["abc #def", "p: q", "it's \"quoted\" \\ {x}", "- [a]"] {
            let charmconf = render_charmconf(password).expect("render charmconf");
            let value: serde_yaml::Value =
                serde_yaml::from_str(&charmconf).expect("charmconf should be valid yaml");
            assert_eq!(value["keystone"]["admin-password"].as_str(), Some(password));
            assert_eq!(value["juju-gui"]["password"].as_str(), Some(password));

            let env = render_juju_env(password).expect("render juju env");
            let value: serde_yaml::Value =
                serde_yaml::from_str(&env).expect("juju env should be valid yaml");
            assert_eq!(
                value["environments"]["local"]["admin-secret"].as_str(),
                Some(password)
            );
        }
    }

    #[test]
    fn test_userdata_values_with_yaml_syntax_survive_parse() {
        let keys = vec!["ssh-rsa AAAA user@host # laptop: work".to_string()];
        let rendered = render_userdata(&keys, &["juju-local"], Some("team/archive #1"))
            .expect("render userdata");

        let value: serde_yaml::Value = serde_yaml::from_str(&rendered).expect("valid yaml");
        assert_eq!(
            value["ssh_authorized_keys"][0].as_str(),
            Some("ssh-rsa AAAA user@host # laptop: work")
        );
        assert_eq!(
            value["apt_sources"][0]["source"].as_str(),
            Some("ppa:team/archive #1")
        );
    }

    #[test]
    fn test_extra_ppa_prefix_is_not_doubled() {
        let keys = vec!["ssh-rsa AAAA tester@host".to_string()];
        for ppa in ["cloud-installer/testing", "ppa:cloud-installer/testing"] {
            let rendered = render_userdata(&keys, &[], Some(ppa)).expect("render userdata");
            let value: serde_yaml::Value = serde_yaml::from_str(&rendered).expect("valid yaml");
            assert_eq!(
                value["apt_sources"][0]["source"].as_str(),
                Some("ppa:cloud-installer/testing")
            );
            assert!(!rendered.contains("ppa:ppa:"));
        }
    }
}
