use reqwest::Url;

use crate::models::Environment;

/// 开发环境放行域名
const DEVELOPMENT_DOMAINS: &[&str] = &[
    "127.0.0.1",
    "localhost",
    "192.168.",         // 局域网地址
    "test.3fenban.com", // 开发环境也允许访问线上测试
];

/// 生产环境放行域名
const PRODUCTION_DOMAINS: &[&str] = &["test.3fenban.com", "api.3fenban.com", "www.3fenban.com"];

/// 域名白名单
///
/// 请求发出前的最后一道闸门: 仅放行环境允许的主机。
///
/// 匹配策略沿用线上实现: 主机名等于或**包含**白名单条目即放行
/// (如 "192.168." 匹配任意局域网主机)。这一宽松策略存在后缀仿冒
/// 风险 (形如 "test.3fenban.com.evil.com" 的主机也会命中),
/// 作为已知弱点保留,未经确认不收紧。
pub struct DomainWhitelist;

impl DomainWhitelist {
    /// 校验URL是否允许访问
    ///
    /// 失败关闭: URL格式错误或缺少主机名一律返回 false,不向上抛错。
    pub fn is_allowed(url: &str, environment: Environment) -> bool {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(error) => {
                tracing::error!(url = %url, 错误 = %error, "URL格式错误");
                return false;
            }
        };

        let hostname = match parsed.host_str() {
            Some(host) => host,
            None => return false,
        };

        Self::domains_for(environment)
            .iter()
            .any(|domain| hostname == *domain || hostname.contains(*domain))
    }

    fn domains_for(environment: Environment) -> &'static [&'static str] {
        match environment {
            Environment::Development => DEVELOPMENT_DOMAINS,
            Environment::Production => PRODUCTION_DOMAINS,
        }
    }
}
