// ==========================================
// 水泥厂监控演示系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享连接与API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::PlantApi;
use crate::config::{ConfigManager, PlantConfig};
use crate::db::open_sqlite_connection;
use crate::repository::ReadingRepository;

/// 应用状态
///
/// 所有仓储共享同一个 SQLite 连接
pub struct AppState {
    /// 数据库路径
    pub db_path: String,

    /// 工厂监控API
    pub plant_api: Arc<PlantApi>,

    /// 读数历史仓储
    pub reading_repo: Arc<ReadingRepository>,

    /// 配置管理器
    pub config_manager: Arc<ConfigManager>,
}

impl AppState {
    /// 创建新的AppState实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径 (":memory:" 亦可)
    ///
    /// # 返回
    /// - Ok(AppState): 应用状态实例
    /// - Err(String): 初始化错误
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let reading_repo = Arc::new(ReadingRepository::from_connection(conn.clone()));
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn)
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );

        let plant_api = Arc::new(PlantApi::new(reading_repo.clone(), config_manager.clone()));

        tracing::info!("AppState初始化完成");
        Ok(Self {
            db_path,
            plant_api,
            reading_repo,
            config_manager,
        })
    }

    /// 按运行配置创建 (未指定路径时使用默认数据目录)
    pub fn from_config(config: &PlantConfig) -> Result<Self, String> {
        let db_path = config
            .db_path
            .clone()
            .unwrap_or_else(get_default_db_path);
        Self::new(db_path)
    }
}

// ==========================================
// 默认数据库路径辅助函数
// ==========================================

/// 获取默认数据库路径
///
/// # 返回
/// - CEMMIND_DB_PATH 环境变量 (非空时)
/// - 用户数据目录/cemmind/cemmind.db
/// - 取不到数据目录时: ./cemmind.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("CEMMIND_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cemmind.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("cemmind");
        // 目录创建失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("cemmind.db");
        }
    }

    path.to_string_lossy().to_string()
}
