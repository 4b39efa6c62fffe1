// ==========================================
// 预制构件日产组合排产 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写、快照与恢复
// 存储: JSON 文件（key → value 文本），默认位于用户配置目录
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::config::mix_config_trait::MixConfigReader;
use crate::config::planner_config::{config_keys, parse_lead_days, validate_value, PlannerConfig};
use crate::domain::types::ViewMode;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// 配置文件路径覆写环境变量
pub const CONFIG_PATH_ENV: &str = "PRECAST_MIX_CONFIG_PATH";

const CONFIG_DIR_NAME: &str = "precast-mix";
const CONFIG_FILE_NAME: &str = "config.json";

// 快照中的元信息键（不回写）
const META_KEY_PREFIX: &str = "__meta_";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Clone)]
pub struct ConfigManager {
    path: Option<PathBuf>,
    values: Arc<Mutex<BTreeMap<String, String>>>,
}

impl ConfigManager {
    /// 仅内存（不落盘）
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    /// 绑定配置文件；文件存在则加载
    pub fn new<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let manager = Self {
            path: Some(path.as_ref().to_path_buf()),
            values: Arc::new(Mutex::new(BTreeMap::new())),
        };
        manager.reload()?;
        Ok(manager)
    }

    /// 默认配置文件（环境变量优先，其次用户配置目录）
    pub fn open_default() -> ConfigResult<Self> {
        match default_config_path() {
            Some(path) => Self::new(path),
            None => {
                warn!("无法确定用户配置目录，使用内存配置");
                Ok(Self::in_memory())
            }
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, BTreeMap<String, String>>> {
        self.values
            .lock()
            .map_err(|e| ConfigError::LockPoisoned(e.to_string()))
    }

    /// 从文件重新加载（文件不存在 → 空配置）
    pub fn reload(&self) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let loaded: BTreeMap<String, String> = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), entries = loaded.len(), "配置已加载");
        *self.lock()? = loaded;
        Ok(())
    }

    /// 写回配置文件（内存模式下无操作）
    pub fn save(&self) -> ConfigResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&*self.lock()?)?;
        std::fs::write(path, json)?;
        info!(path = %path.display(), "配置已保存");
        Ok(())
    }

    /// 读取配置值
    pub fn get(&self, key: &str) -> ConfigResult<Option<String>> {
        if !config_keys::ALL.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        Ok(self.lock()?.get(key).cloned())
    }

    /// 设置配置值（校验后写入内存，调用 save 落盘）
    pub fn set(&self, key: &str, value: &str) -> ConfigResult<()> {
        validate_value(key, value)?;
        self.lock()?.insert(key.to_string(), value.trim().to_string());
        debug!(key, value, "配置已更新");
        Ok(())
    }

    /// 删除配置值（恢复默认）
    pub fn unset(&self, key: &str) -> ConfigResult<Option<String>> {
        if !config_keys::ALL.contains(&key) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }
        Ok(self.lock()?.remove(key))
    }

    /// 读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }

    /// 解析配置值；格式错误时告警并使用默认值
    fn get_parsed_or_default<T, F>(&self, key: &str, default: T, parse: F) -> ConfigResult<T>
    where
        F: FnOnce(&str) -> Option<T>,
    {
        let Some(raw) = self.get(key)? else {
            return Ok(default);
        };
        match parse(&raw) {
            Some(value) => Ok(value),
            None => {
                warn!(config_key = key, raw_value = %raw, "配置格式错误，使用默认值");
                Ok(default)
            }
        }
    }

    /// 获取所有配置的快照（JSON 格式）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string(&*self.lock()?)?)
    }

    /// 从配置快照恢复配置
    ///
    /// 元信息键跳过；任一值校验失败则整体不生效
    pub fn restore_config_from_snapshot(&self, snapshot_json: &str) -> ConfigResult<usize> {
        let snapshot: BTreeMap<String, String> = serde_json::from_str(snapshot_json)?;

        let mut restored = BTreeMap::new();
        for (key, value) in snapshot {
            if key.starts_with(META_KEY_PREFIX) {
                continue;
            }
            validate_value(&key, &value)?;
            restored.insert(key, value);
        }

        let count = restored.len();
        *self.lock()? = restored;
        info!(count, "配置已从快照恢复");
        Ok(count)
    }
}

/// 默认配置文件路径
pub fn default_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

// ==========================================
// MixConfigReader Trait 实现
// ==========================================
#[async_trait]
impl MixConfigReader for ConfigManager {
    async fn get_daily_capacity_m3(&self) -> ConfigResult<f64> {
        let default = PlannerConfig::default().daily_capacity_m3;
        let value = self.get_config_or_default(config_keys::DAILY_CAPACITY_M3, &default.to_string())?;
        Ok(value.trim().replace(',', ".").parse::<f64>().unwrap_or(default))
    }

    async fn get_use_business_days(&self) -> ConfigResult<bool> {
        self.get_parsed_or_default(config_keys::USE_BUSINESS_DAYS, true, |raw| {
            let mut probe = PlannerConfig::default();
            probe
                .set(config_keys::USE_BUSINESS_DAYS, raw)
                .ok()
                .map(|_| probe.use_business_days)
        })
    }

    async fn get_locale(&self) -> ConfigResult<String> {
        self.get_config_or_default(config_keys::LOCALE, &PlannerConfig::default().locale)
    }

    async fn get_pending_display_limit(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::PENDING_DISPLAY_LIMIT, 200, |raw| {
            raw.trim().parse().ok()
        })
    }

    async fn get_sequence_mismatch_display_limit(&self) -> ConfigResult<usize> {
        self.get_parsed_or_default(config_keys::SEQUENCE_MISMATCH_DISPLAY_LIMIT, 100, |raw| {
            raw.trim().parse().ok()
        })
    }

    async fn get_detailing_lead_business_days(&self) -> ConfigResult<u32> {
        self.get_parsed_or_default(config_keys::DETAILING_LEAD_BUSINESS_DAYS, 5, |raw| {
            parse_lead_days(raw).ok()
        })
    }

    async fn get_view_mode(&self) -> ConfigResult<ViewMode> {
        self.get_parsed_or_default(config_keys::VIEW_MODE, ViewMode::Daily, |raw| {
            raw.parse().ok()
        })
    }
}
