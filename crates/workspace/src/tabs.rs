use dendro_domain::{FileKind, TabName};
use tracing::debug;

pub const DEFAULT_MAX_LABEL_LENGTH: usize = 18;
const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIcon {
    File(FileKind),
    Job,
}

/// 渲染用的标签页视图，每次渲染重新计算
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabView {
    pub name: TabName,
    pub label: String,
    pub icon: TabIcon,
    pub current: bool,
}

/// 工作区标签页
///
/// 有序、无重复；`current` 要么为空，要么是某个已打开的标签页。
#[derive(Debug, Clone)]
pub struct WorkspaceTabs {
    tabs: Vec<TabName>,
    current: Option<TabName>,
    max_label_length: usize,
}

impl Default for WorkspaceTabs {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LABEL_LENGTH)
    }
}

impl WorkspaceTabs {
    pub fn new(max_label_length: usize) -> Self {
        Self {
            tabs: Vec::new(),
            current: None,
            max_label_length,
        }
    }

    pub fn open(&mut self, tab: TabName) {
        if !self.tabs.contains(&tab) {
            debug!("打开标签页 {}", tab);
            self.tabs.push(tab.clone());
        }
        self.current = Some(tab);
    }

    /// 关闭标签页；若关闭的是当前页，当前页移到原位置上的标签页，否则最后一个
    pub fn close(&mut self, tab: &TabName) {
        let Some(index) = self.tabs.iter().position(|t| t == tab) else {
            return;
        };
        self.tabs.remove(index);
        debug!("关闭标签页 {}", tab);

        if self.current.as_ref() == Some(tab) {
            self.current = self
                .tabs
                .get(index)
                .or_else(|| self.tabs.last())
                .cloned();
        }
    }

    /// 文件被删除后关闭其标签页
    pub fn close_file_tab(&mut self, file_name: &str) {
        self.close(&TabName::file(file_name));
    }

    pub fn set_current(&mut self, tab: &TabName) {
        if self.tabs.contains(tab) {
            self.current = Some(tab.clone());
        }
    }

    pub fn current(&self) -> Option<&TabName> {
        self.current.as_ref()
    }

    pub fn tabs(&self) -> &[TabName] {
        &self.tabs
    }

    pub fn is_open(&self, tab: &TabName) -> bool {
        self.tabs.contains(tab)
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn label(&self, tab: &TabName) -> String {
        tab_label(tab, self.max_label_length)
    }

    pub fn views(&self) -> Vec<TabView> {
        self.tabs
            .iter()
            .map(|tab| TabView {
                name: tab.clone(),
                label: self.label(tab),
                icon: tab_icon(tab),
                current: self.current.as_ref() == Some(tab),
            })
            .collect()
    }
}

/// 文件标签显示文件名，作业标签显示 `job:<id>`；超长时截断并以 `...` 结尾
pub fn tab_label(tab: &TabName, max_len: usize) -> String {
    match tab {
        TabName::File(file_name) => abbreviate(file_name, max_len),
        TabName::Job(_) => abbreviate(&tab.to_string(), max_len),
    }
}

pub fn tab_icon(tab: &TabName) -> TabIcon {
    match tab {
        TabName::File(file_name) => TabIcon::File(FileKind::from_file_name(file_name)),
        TabName::Job(_) => TabIcon::Job,
    }
}

fn abbreviate(text: &str, max_len: usize) -> String {
    let count = text.chars().count();
    if count <= max_len || max_len <= ELLIPSIS.len() {
        return text.to_string();
    }
    let keep = max_len - ELLIPSIS.len();
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}
