//! Shared fixtures for lifecycle tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use alextras_core::types::{PageUrl, SiteSurface};
use alextras_module::{
    EventBus, MemoryStyleSheets, ModuleDescriptor, ModuleRegistry, NavigationContext, PageModule,
    UnloadContext,
};
use alextras_store::Store;

/// Ordered log of module callbacks.
#[derive(Debug, Default)]
pub struct Calls(Mutex<Vec<String>>);

impl Calls {
    pub fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub fn all(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|c| *c == call).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scope {
    /// `/anime/<id>` overview pages only.
    Overview,
    /// Any page.
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    Ok,
    Fail,
    Panic,
}

/// A configurable module recording every callback.
pub struct TestModule {
    pub descriptor: ModuleDescriptor,
    pub calls: Arc<Calls>,
    pub scope: Scope,
    pub unload: Option<Behavior>,
    pub load: Behavior,
    pub validate: Behavior,
    pub validate_delay: Duration,
    /// Keep the module active while the previous and current page are equal.
    pub retain_on_same_page: bool,
    /// Keep the module active while the `/anime/<id>` entry is unchanged.
    pub retain_within_entry: bool,
}

impl TestModule {
    pub fn new(id: &str, calls: Arc<Calls>) -> Self {
        Self {
            descriptor: ModuleDescriptor::new(id, id),
            calls,
            scope: Scope::Overview,
            unload: Some(Behavior::Ok),
            load: Behavior::Ok,
            validate: Behavior::Ok,
            validate_delay: Duration::ZERO,
            retain_on_same_page: false,
            retain_within_entry: false,
        }
    }

    fn id(&self) -> &str {
        &self.descriptor.id
    }

    fn act(&self, phase: &str, behavior: Behavior) -> anyhow::Result<()> {
        self.calls.push(format!("{phase}:{}", self.id()));
        match behavior {
            Behavior::Ok => Ok(()),
            Behavior::Fail => anyhow::bail!("{phase} failed"),
            Behavior::Panic => panic!("{phase} exploded"),
        }
    }
}

#[async_trait]
impl PageModule for TestModule {
    fn descriptor(&self) -> ModuleDescriptor {
        self.descriptor.clone()
    }

    async fn validate(&self, ctx: &NavigationContext) -> anyhow::Result<bool> {
        if !self.validate_delay.is_zero() {
            tokio::time::sleep(self.validate_delay).await;
        }
        self.act("validate", self.validate)?;
        Ok(match self.scope {
            Scope::Any => true,
            Scope::Overview => {
                let segments: Vec<&str> = ctx.current_page.path().trim_matches('/').split('/').collect();
                segments.len() == 2 && segments[0] == "anime"
            }
        })
    }

    async fn validate_unload(&self, ctx: &UnloadContext) -> anyhow::Result<bool> {
        if self.retain_within_entry {
            let previous = ctx.previous_page.as_ref().map(entry_of);
            return Ok(previous != Some(entry_of(&ctx.current_page)));
        }
        if self.retain_on_same_page {
            return Ok(ctx.previous_page.as_ref() != Some(&ctx.current_page));
        }
        Ok(true)
    }

    async fn load(&self, ctx: &NavigationContext) -> anyhow::Result<()> {
        if let Some(mal_id) = ctx.media.mal_id {
            self.calls.push(format!("media:{}:{mal_id}", self.id()));
        }
        self.act("load", self.load)
    }

    fn has_unload(&self) -> bool {
        self.unload.is_some()
    }

    async fn unload(&self, _ctx: &UnloadContext) -> anyhow::Result<()> {
        self.act("unload", self.unload.unwrap_or(Behavior::Ok))
    }
}

pub struct Harness {
    pub registry: Arc<ModuleRegistry>,
    pub bus: Arc<EventBus>,
    pub styles: Arc<MemoryStyleSheets>,
    pub store: Arc<Store>,
}

pub async fn harness(surface: SiteSurface) -> Harness {
    let store = Arc::new(Store::in_memory().await.unwrap());
    harness_with_store(surface, store)
}

pub fn harness_with_store(surface: SiteSurface, store: Arc<Store>) -> Harness {
    let bus = Arc::new(EventBus::default());
    let styles = Arc::new(MemoryStyleSheets::new());
    let registry = Arc::new(ModuleRegistry::new(
        surface,
        store.clone(),
        bus.clone(),
        styles.clone(),
    ));
    Harness {
        registry,
        bus,
        styles,
        store,
    }
}

/// The first two path segments, e.g. `anime/21` for `/anime/21/staff`.
pub fn entry_of(page: &PageUrl) -> String {
    page.path()
        .trim_matches('/')
        .split('/')
        .take(2)
        .collect::<Vec<_>>()
        .join("/")
}

pub fn page(path: &str) -> PageUrl {
    PageUrl::parse(&format!("https://anilist.co{path}")).unwrap()
}
