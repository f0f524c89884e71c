use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::models::{ApiConfig, Environment};

/// 配置服务
///
/// 解析进程环境与 `.env` 覆盖项,产出完整的API配置。
/// 无失败路径: 覆盖配置缺失时回落到内置默认值。
pub struct ConfigService;

impl ConfigService {
    /// 获取 .env 文件路径
    ///
    /// 查找顺序:
    /// 1. 当前工作目录的 .env
    /// 2. 上层目录 (适用于在子目录内执行的情况)
    fn env_file_path() -> Option<PathBuf> {
        let cwd = env::current_dir().ok()?;

        let env_path = cwd.join(".env");
        if env_path.exists() {
            return Some(env_path);
        }

        if let Some(parent) = cwd.parent() {
            let parent_env = parent.join(".env");
            if parent_env.exists() {
                return Some(parent_env);
            }
        }

        None
    }

    /// 解析 .env 文件内容为 HashMap
    ///
    /// 格式: KEY=VALUE
    /// 忽略空行和注释行(以 # 开头)
    fn parse_env_content(content: &str) -> HashMap<String, String> {
        content
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                // 忽略空行和注释
                if trimmed.is_empty() || trimmed.starts_with('#') {
                    return None;
                }

                // 解析 KEY=VALUE
                trimmed
                    .split_once('=')
                    .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            })
            .collect()
    }

    /// 读取 API_BASE_URL 覆盖项
    ///
    /// 优先级: 进程环境变量 > .env 文件。两者都缺失返回 None。
    fn base_url_override() -> Option<String> {
        if let Ok(value) = env::var("API_BASE_URL") {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }

        let path = Self::env_file_path()?;
        let content = fs::read_to_string(path).ok()?;
        let vars = Self::parse_env_content(&content);
        vars.get("API_BASE_URL")
            .cloned()
            .filter(|value| !value.is_empty())
    }

    /// 解析当前环境的API配置
    ///
    /// 先加载 .env 到进程环境 (存在时),再按环境标志取默认值,
    /// 最后应用 API_BASE_URL 覆盖项。
    pub fn load_api_config() -> ApiConfig {
        dotenvy::dotenv().ok();
        Self::load_api_config_for(Environment::current())
    }

    /// 解析指定环境的API配置
    pub fn load_api_config_for(environment: Environment) -> ApiConfig {
        let mut config = ApiConfig::defaults_for(environment);

        if let Some(base_url) = Self::base_url_override() {
            tracing::info!(覆盖地址 = %base_url, "使用外部配置的API地址");
            config.base_url = base_url;
        }

        config
    }

    /// 打印当前API配置 (用于调试)
    pub fn log_api_config(config: &ApiConfig) {
        tracing::info!(
            环境 = config.environment.as_str(),
            接口地址 = %config.base_url,
            超时时间 = config.timeout_ms,
            重试次数 = config.retry_count,
            "API配置信息"
        );
    }
}
