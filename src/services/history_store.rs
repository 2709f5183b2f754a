//! 问题历史存储 - 业务能力层
//!
//! 持久化的问题指纹集合，用于让后续生成避开已出现过的问题。
//! 只作软性过滤：全部候选都重复时照常放行，绝不因此失败。
//!
//! 指纹丢失会使防重复机制失效，所以加载与持久化失败都按
//! 致命错误上抛，而不是静默吞掉。

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 历史文件名（JSON 数组，整体覆盖写入）
const HISTORY_FILE_NAME: &str = "preguntas_historicas.json";

/// 问题历史存储
pub struct HistoryStore {
    path: PathBuf,
    hashes: HashSet<String>,
    punctuation_re: Regex,
}

impl HistoryStore {
    /// 创建指向指定缓存目录的存储（不做 IO）
    pub fn new(cache_dir: &str) -> Self {
        Self {
            path: Path::new(cache_dir).join(HISTORY_FILE_NAME),
            hashes: HashSet::new(),
            punctuation_re: Regex::new(r"[^\w\s]").expect("内置正则必须合法"),
        }
    }

    /// 从磁盘加载历史指纹
    ///
    /// 文件不存在视为空历史；文件存在但读不出来是致命错误。
    pub fn load(&mut self) -> AppResult<()> {
        if !self.path.exists() {
            debug!("问题历史文件不存在，从空历史开始");
            return Ok(());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| AppError::store_load_failed(self.path.display().to_string(), e))?;

        let hashes: Vec<String> = serde_json::from_str(&content)
            .map_err(|e| AppError::store_corrupted(self.path.display().to_string(), e))?;

        self.hashes = hashes.into_iter().collect();
        info!("✓ 已加载 {} 条历史问题指纹", self.hashes.len());

        Ok(())
    }

    /// 该问题是否出现过
    pub fn is_known(&self, question: &str) -> bool {
        self.hashes.contains(&self.fingerprint(question))
    }

    /// 记录一个问题
    pub fn remember(&mut self, question: &str) {
        self.hashes.insert(self.fingerprint(question));
    }

    /// 将全部指纹覆盖写入磁盘
    pub fn persist(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AppError::store_persist_failed(self.path.display().to_string(), e))?;
        }

        // 排序后写出，保证文件内容稳定可比对
        let mut hashes: Vec<&String> = self.hashes.iter().collect();
        hashes.sort();

        let content = serde_json::to_string_pretty(&hashes)
            .map_err(|e| AppError::store_persist_failed(self.path.display().to_string(), e))?;

        fs::write(&self.path, content)
            .map_err(|e| AppError::store_persist_failed(self.path.display().to_string(), e))?;

        debug!("已持久化 {} 条问题指纹至 {}", self.hashes.len(), self.path.display());

        Ok(())
    }

    /// 指纹数量
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// 计算归一化问题的指纹
    fn fingerprint(&self, question: &str) -> String {
        let normalized = self.normalize(question);
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        format!("{:x}", hasher.finalize())
    }

    /// 归一化：小写、去标点、折叠空白
    fn normalize(&self, question: &str) -> String {
        let lower = question.to_lowercase();
        let stripped = self.punctuation_re.replace_all(&lower, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remember_and_is_known() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let mut store = HistoryStore::new(dir.path().to_str().unwrap());

        assert!(!store.is_known("¿Cómo se aplica el sérum?"));
        store.remember("¿Cómo se aplica el sérum?");
        assert!(store.is_known("¿Cómo se aplica el sérum?"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_normalization_makes_variants_equal() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let mut store = HistoryStore::new(dir.path().to_str().unwrap());

        store.remember("¿Cómo   se aplica EL sérum?");
        // 大小写、标点、多余空白都不影响指纹
        assert!(store.is_known("cómo se aplica el sérum"));
        assert!(store.is_known("¡Cómo se aplica el sérum!"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_persist_and_reload_round_trip() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let cache_dir = dir.path().to_str().unwrap();

        let questions = [
            "¿Cuánto tarda en mostrar resultados?",
            "¿Qué concentración de retinol contiene?",
            "¿Puedo usarlo durante el embarazo?",
        ];

        let mut store = HistoryStore::new(cache_dir);
        for q in &questions {
            store.remember(q);
        }
        store.persist().expect("持久化失败");

        // 重新加载后集合完全一致：不丢、不重
        let mut reloaded = HistoryStore::new(cache_dir);
        reloaded.load().expect("加载失败");
        assert_eq!(reloaded.len(), questions.len());
        for q in &questions {
            assert!(reloaded.is_known(q));
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let mut store = HistoryStore::new(dir.path().join("nueva").to_str().unwrap());
        store.load().expect("不存在的历史文件应视为空");
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_corrupted_file_is_fatal() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let cache_dir = dir.path().to_str().unwrap();
        std::fs::write(dir.path().join(HISTORY_FILE_NAME), "no es json").unwrap();

        let mut store = HistoryStore::new(cache_dir);
        assert!(store.load().is_err());
    }
}
