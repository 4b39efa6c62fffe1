// ==========================================
// 预制构件日产组合排产 - 排产参数
// ==========================================
// 职责: 参数定义、默认值、键值解析与校验
// 红线: 展示截断参数只影响展示，不影响排产结果
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::types::ViewMode;
use crate::i18n;
use serde::{Deserialize, Serialize};

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 产能
    pub const DAILY_CAPACITY_M3: &str = "daily_capacity_m3";

    // 日历
    pub const USE_BUSINESS_DAYS: &str = "use_business_days";

    // 展示
    pub const LOCALE: &str = "locale";
    pub const PENDING_DISPLAY_LIMIT: &str = "pending_display_limit";
    pub const SEQUENCE_MISMATCH_DISPLAY_LIMIT: &str = "sequence_mismatch_display_limit";
    pub const VIEW_MODE: &str = "view_mode";

    // 深化设计（D-N）
    pub const DETAILING_LEAD_BUSINESS_DAYS: &str = "detailing_lead_business_days";

    // D-N 的 N 上限（工作日）
    pub const MAX_DETAILING_LEAD_BUSINESS_DAYS: u32 = 365;

    /// 全部已知键
    pub const ALL: &[&str] = &[
        DAILY_CAPACITY_M3,
        USE_BUSINESS_DAYS,
        LOCALE,
        PENDING_DISPLAY_LIMIT,
        SEQUENCE_MISMATCH_DISPLAY_LIMIT,
        VIEW_MODE,
        DETAILING_LEAD_BUSINESS_DAYS,
    ];
}

// ==========================================
// PlannerConfig - 排产参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    pub daily_capacity_m3: f64,                 // 日均产能（m³/天）
    pub use_business_days: bool,                // true: 周一至周五；false: 自然日
    pub locale: String,                         // 展示语言
    pub pending_display_limit: usize,           // 缺主键待处理项展示上限
    pub sequence_mismatch_display_limit: usize, // CT/SEQUENCIA 不匹配展示上限
    pub detailing_lead_business_days: u32,      // D-N 的 N
    pub view_mode: ViewMode,                    // 周期视图
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            daily_capacity_m3: 30.0,
            use_business_days: true,
            locale: i18n::DEFAULT_LOCALE.to_string(),
            pending_display_limit: 200,
            sequence_mismatch_display_limit: 100,
            detailing_lead_business_days: 5,
            view_mode: ViewMode::Daily,
        }
    }
}

impl PlannerConfig {
    /// 参数整体校验（API 层在排产前调用）
    pub fn validate(&self) -> ConfigResult<()> {
        parse_capacity(&self.daily_capacity_m3.to_string())?;
        validate_value(config_keys::LOCALE, &self.locale)?;
        parse_lead_days(&self.detailing_lead_business_days.to_string())?;
        Ok(())
    }

    /// 按键取值（文本形式）
    pub fn get(&self, key: &str) -> ConfigResult<String> {
        let value = match key {
            config_keys::DAILY_CAPACITY_M3 => self.daily_capacity_m3.to_string(),
            config_keys::USE_BUSINESS_DAYS => self.use_business_days.to_string(),
            config_keys::LOCALE => self.locale.clone(),
            config_keys::PENDING_DISPLAY_LIMIT => self.pending_display_limit.to_string(),
            config_keys::SEQUENCE_MISMATCH_DISPLAY_LIMIT => {
                self.sequence_mismatch_display_limit.to_string()
            }
            config_keys::VIEW_MODE => self.view_mode.to_string(),
            config_keys::DETAILING_LEAD_BUSINESS_DAYS => {
                self.detailing_lead_business_days.to_string()
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        };
        Ok(value)
    }

    /// 按键设值（解析并校验）
    pub fn set(&mut self, key: &str, value: &str) -> ConfigResult<()> {
        match key {
            config_keys::DAILY_CAPACITY_M3 => self.daily_capacity_m3 = parse_capacity(value)?,
            config_keys::USE_BUSINESS_DAYS => self.use_business_days = parse_bool(key, value)?,
            config_keys::LOCALE => {
                validate_value(key, value)?;
                self.locale = value.trim().to_string();
            }
            config_keys::PENDING_DISPLAY_LIMIT => {
                self.pending_display_limit = parse_usize(key, value)?
            }
            config_keys::SEQUENCE_MISMATCH_DISPLAY_LIMIT => {
                self.sequence_mismatch_display_limit = parse_usize(key, value)?
            }
            config_keys::VIEW_MODE => {
                self.view_mode = value.parse::<ViewMode>().map_err(|message| invalid(key, value, message))?
            }
            config_keys::DETAILING_LEAD_BUSINESS_DAYS => {
                self.detailing_lead_business_days = parse_lead_days(value)?
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

/// 校验单个键值（不修改任何状态）
pub fn validate_value(key: &str, value: &str) -> ConfigResult<()> {
    match key {
        config_keys::LOCALE => {
            if i18n::is_supported(value.trim()) {
                Ok(())
            } else {
                Err(invalid(
                    key,
                    value,
                    format!("支持的语言: {}", i18n::SUPPORTED_LOCALES.join(", ")),
                ))
            }
        }
        _ => {
            let mut probe = PlannerConfig::default();
            probe.set(key, value)
        }
    }
}

/// 日产能：必须为有限正数
pub fn parse_capacity(value: &str) -> ConfigResult<f64> {
    let key = config_keys::DAILY_CAPACITY_M3;
    let capacity = value
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|e| invalid(key, value, e.to_string()))?;
    if !capacity.is_finite() || capacity <= 0.0 {
        return Err(invalid(key, value, "必须为大于 0 的有限数".to_string()));
    }
    Ok(capacity)
}

/// D-N 提前量：0..=365 个工作日
pub fn parse_lead_days(value: &str) -> ConfigResult<u32> {
    let key = config_keys::DETAILING_LEAD_BUSINESS_DAYS;
    let days = value
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(key, value, e.to_string()))?;
    if days > config_keys::MAX_DETAILING_LEAD_BUSINESS_DAYS {
        return Err(invalid(
            key,
            value,
            format!("不能超过 {} 个工作日", config_keys::MAX_DETAILING_LEAD_BUSINESS_DAYS),
        ));
    }
    Ok(days)
}

fn parse_bool(key: &str, value: &str) -> ConfigResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "sim" | "s" => Ok(true),
        "false" | "0" | "no" | "nao" | "não" | "n" => Ok(false),
        _ => Err(invalid(key, value, "期望布尔值".to_string())),
    }
}

fn parse_usize(key: &str, value: &str) -> ConfigResult<usize> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| invalid(key, value, e.to_string()))
}

fn invalid(key: &str, value: &str, message: String) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.daily_capacity_m3, 30.0);
        assert!(config.use_business_days);
        assert_eq!(config.locale, "pt-BR");
        assert_eq!(config.pending_display_limit, 200);
        assert_eq!(config.sequence_mismatch_display_limit, 100);
        assert_eq!(config.detailing_lead_business_days, 5);
        assert_eq!(config.view_mode, ViewMode::Daily);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_and_get_round_trip_by_key() {
        let mut config = PlannerConfig::default();
        config.set(config_keys::DAILY_CAPACITY_M3, "25,5").unwrap();
        config.set(config_keys::USE_BUSINESS_DAYS, "não").unwrap();
        config.set(config_keys::VIEW_MODE, "semanal").unwrap();

        assert_eq!(config.daily_capacity_m3, 25.5);
        assert!(!config.use_business_days);
        assert_eq!(config.get(config_keys::VIEW_MODE).unwrap(), "weekly");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = PlannerConfig::default();
        assert!(matches!(
            config.set(config_keys::DAILY_CAPACITY_M3, "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(config.set(config_keys::DAILY_CAPACITY_M3, "inf").is_err());
        assert!(config.set(config_keys::LOCALE, "fr").is_err());
        assert!(config.set(config_keys::PENDING_DISPLAY_LIMIT, "-1").is_err());
        assert!(matches!(
            config.set("unknown", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        // 失败的设置不改变原值
        assert_eq!(config.daily_capacity_m3, 30.0);
    }

    #[test]
    fn test_detailing_lead_bounded() {
        let mut config = PlannerConfig::default();
        config
            .set(config_keys::DETAILING_LEAD_BUSINESS_DAYS, "365")
            .unwrap();
        assert_eq!(config.detailing_lead_business_days, 365);

        assert!(matches!(
            config.set(config_keys::DETAILING_LEAD_BUSINESS_DAYS, "366"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            config.set(config_keys::DETAILING_LEAD_BUSINESS_DAYS, "100000000"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(config.detailing_lead_business_days, 365);

        // 直接构造的越界值在整体校验时被拒绝
        config.detailing_lead_business_days = 100_000_000;
        assert!(config.validate().is_err());
    }
}
