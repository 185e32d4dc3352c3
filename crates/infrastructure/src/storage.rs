use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use dendro_domain::KeyValueStore;
use dendro_errors::{DendroError, DendroResult};
use tracing::{debug, warn};

/// 以单个 JSON 对象文件保存全部键值
///
/// 写入先落到临时文件再重命名，读者看不到写了一半的文件。
/// 文件内容损坏时读取报错，下一次写入会以空内容覆盖它。
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// `<data_dir>/storage.json`
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join("storage.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 外层 `Err` 是 IO 错误，内层 `Err` 是文件内容无法解析
    fn read_file(&self) -> DendroResult<Result<BTreeMap<String, String>, serde_json::Error>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(Ok(BTreeMap::new())),
            Ok(text) => Ok(serde_json::from_str(&text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Ok(BTreeMap::new())),
            Err(e) => Err(e.into()),
        }
    }

    fn read_all(&self) -> DendroResult<BTreeMap<String, String>> {
        self.read_file()?.map_err(|e| {
            DendroError::storage_error(format!(
                "存储文件 {} 格式错误: {e}",
                self.path.display()
            ))
        })
    }

    fn read_for_update(&self) -> DendroResult<BTreeMap<String, String>> {
        match self.read_file()? {
            Ok(values) => Ok(values),
            Err(e) => {
                warn!(
                    "Store file {} is corrupt and will be replaced: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn write_all(&self, values: &BTreeMap<String, String>) -> DendroResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(values)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!("Wrote store file {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> DendroResult<Option<String>> {
        let _guard = self.guard();
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DendroResult<()> {
        let _guard = self.guard();
        let mut values = self.read_for_update()?;
        values.insert(key.to_string(), value.to_string());
        self.write_all(&values)
    }

    fn remove(&self, key: &str) -> DendroResult<()> {
        let _guard = self.guard();
        match self.read_file()? {
            Ok(mut values) => {
                if values.remove(key).is_some() {
                    self.write_all(&values)?;
                }
            }
            Err(e) => {
                warn!(
                    "Store file {} is corrupt and will be reset: {}",
                    self.path.display(),
                    e
                );
                self.write_all(&BTreeMap::new())?;
            }
        }
        Ok(())
    }
}

/// 进程内存储，不落盘
#[derive(Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> DendroResult<Option<String>> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> DendroResult<()> {
        self.values().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> DendroResult<()> {
        self.values().remove(key);
        Ok(())
    }
}
