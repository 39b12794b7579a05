//! Listing state carried between shell commands.
//!
//! The caller owns a [`Session`] and passes it to each command; the storage
//! engine itself is stateless.

use crate::config::ListConfig;
use crate::error::{Error, Result};
use crate::query::{Filter, ListOptions, Order};
use crate::storage::Root;

#[derive(Debug, Clone)]
pub struct Session {
    pub root: Root,
    pub list: ListOptions,
    defaults: ListOptions,
}

impl Session {
    pub fn new(defaults: ListOptions) -> Self {
        Self {
            root: Root::Active,
            list: defaults.clone(),
            defaults,
        }
    }

    pub fn from_config(config: &ListConfig) -> Result<Self> {
        Ok(Self::new(ListOptions {
            filter: config.parsed_filter()?,
            order: config.parsed_order()?,
            limit: Some(config.limit),
        }))
    }

    pub fn set_filter(&mut self, raw: &str) -> Result<()> {
        self.list.filter = raw.parse::<Filter>()?;
        Ok(())
    }

    pub fn reset_filter(&mut self) {
        self.list.filter = self.defaults.filter.clone();
    }

    pub fn set_order(&mut self, raw: &str) -> Result<()> {
        let order = raw.parse::<Order>()?;
        if order.is_empty() {
            return Err(Error::InvalidArgument("empty order".to_string()));
        }
        self.list.order = order;
        Ok(())
    }

    pub fn reset_order(&mut self) {
        self.list.order = self.defaults.order.clone();
    }

    pub fn set_limit(&mut self, raw: &str) -> Result<()> {
        let limit = raw
            .trim()
            .parse::<usize>()
            .map_err(|_| Error::InvalidArgument(format!("bad limit '{raw}'")))?;
        self.list.limit = Some(limit);
        Ok(())
    }

    pub fn reset_limit(&mut self) {
        self.list.limit = self.defaults.limit;
    }

    /// Point the session at `root`, or flip it when `None`.
    pub fn switch_root(&mut self, root: Option<Root>) {
        self.root = root.unwrap_or_else(|| self.root.opposite());
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::from_config(&ListConfig::default())
            .unwrap_or_else(|_| Self::new(ListOptions::default()))
    }
}
