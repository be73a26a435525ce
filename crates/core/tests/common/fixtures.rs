//! Temporary host environments for workflow tests.

use std::path::PathBuf;
use tempfile::TempDir;
use uoi_core::config::models::InstallerConfig;

pub const TEST_PUBLIC_KEY: &str = "ssh-rsa AAAAB3NzaC1yc2E tester@host";
pub const TEST_PASSWORD: &str = "openstack-s3cret";

/// A throwaway home directory with SSH keys and an install config.
pub struct TestHost {
    // Held so the directory lives as long as the host.
    _dir: TempDir,
    pub config: InstallerConfig,
}

#[allow(dead_code)]
impl TestHost {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let home = dir.path().join("home");
        let ssh = home.join(".ssh");
        std::fs::create_dir_all(&ssh).expect("create .ssh");
        std::fs::write(ssh.join("id_rsa"), "PRIVATE KEY").expect("write private key");
        std::fs::write(ssh.join("id_rsa.pub"), format!("{}\n", TEST_PUBLIC_KEY))
            .expect("write public key");

        let mut config = InstallerConfig::with_defaults(
            &home.join(".cloud-install"),
            &home,
            TEST_PASSWORD.to_string(),
        );
        config.container_path = dir.path().join("lxc");

        Self { _dir: dir, config }
    }

    /// Simulate a leftover container from a previous install.
    pub fn with_existing_container(self) -> Self {
        std::fs::create_dir_all(self.config.container_abspath()).expect("create container dir");
        self
    }

    pub fn cfg_file(&self, name: &str) -> PathBuf {
        self.config.cfg_path.join(name)
    }

    pub fn read_cfg_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.cfg_file(name))
            .unwrap_or_else(|e| panic!("{} should be readable: {}", name, e))
    }
}
