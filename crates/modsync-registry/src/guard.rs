use std::path::Path;

use anyhow::Result;

pub trait ModuleHost {
    fn current_host_module(&self) -> Option<String>;

    fn is_loaded(&self, name: &str) -> bool;

    fn unload_module(&self, name: &str) -> Result<()>;

    fn reload_module(&self, name: &str, version_dir: &Path) -> Result<()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoHost;

impl ModuleHost for NoHost {
    fn current_host_module(&self) -> Option<String> {
        None
    }

    fn is_loaded(&self, _name: &str) -> bool {
        false
    }

    fn unload_module(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn reload_module(&self, _name: &str, _version_dir: &Path) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SelfGuard {
    host_module: Option<String>,
}

impl SelfGuard {
    pub fn new(host: &dyn ModuleHost) -> Self {
        Self {
            host_module: host.current_host_module(),
        }
    }

    pub fn is_self_target(&self, name: &str) -> bool {
        self.host_module
            .as_deref()
            .is_some_and(|own| own.eq_ignore_ascii_case(name))
    }
}
