//! 作文存储 - 基础设施层
//!
//! 持有唯一的数据库连接，只暴露"存 / 查"能力。
//! 连接在每次操作内加锁获取，操作结束（包括出错返回）即释放；
//! 一份投稿的全部写入在同一个事务里完成，任何阶段失败都整体回滚。

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{AppResult, NotFound, PersistStage, PersistenceError};
use crate::models::grade::GradeRecord;
use crate::models::rubric;
use crate::models::submission::{Author, AuthorSummary, EssaySummary, NewSubmission, StoredEssay};

const SCHEMA: &str = "
    PRAGMA foreign_keys = ON;
    CREATE TABLE IF NOT EXISTS authors (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        authorname  TEXT NOT NULL UNIQUE,
        name        TEXT
    );
    CREATE TABLE IF NOT EXISTS essays (
        id              INTEGER PRIMARY KEY AUTOINCREMENT,
        author_id       INTEGER NOT NULL REFERENCES authors(id),
        title           TEXT NOT NULL,
        text            TEXT NOT NULL,
        date_submitted  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS essay_images (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        essay_id    INTEGER NOT NULL REFERENCES essays(id),
        image_path  TEXT NOT NULL
    );
    CREATE TABLE IF NOT EXISTS essay_grades (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        essay_id    INTEGER NOT NULL REFERENCES essays(id),
        grade_type  TEXT NOT NULL,
        grade       INTEGER,
        comments    TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_essays_author ON essays(author_id);
    CREATE INDEX IF NOT EXISTS idx_images_essay ON essay_images(essay_id);
    CREATE INDEX IF NOT EXISTS idx_grades_essay ON essay_grades(essay_id);
";

/// 作文存储接口
#[async_trait]
pub trait EssayStore: Send + Sync {
    /// 保存一份投稿（作者不存在时自动创建），返回作文 ID
    async fn save_submission(&self, submission: &NewSubmission) -> Result<i64, PersistenceError>;

    /// 创建作者，`authorname` 重复时报错
    async fn create_author(&self, authorname: &str, name: Option<&str>) -> Result<Author, PersistenceError>;

    /// 所有作者及其作文摘要
    async fn list_authors(&self) -> Result<Vec<AuthorSummary>, PersistenceError>;

    /// 某个作者的全部作文（含评分和图片）
    async fn author_grades(&self, authorname: &str) -> AppResult<Vec<StoredEssay>>;

    /// 按 ID 读取作文
    async fn essay(&self, essay_id: i64) -> AppResult<StoredEssay>;
}

/// SQLite 实现
pub struct SqliteEssayStore {
    conn: Mutex<Connection>,
}

impl SqliteEssayStore {
    /// 打开（或创建）数据库文件
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PersistenceError> {
        let open_err = |e| PersistenceError::new(PersistStage::Open, e);
        let conn = Connection::open(path.as_ref()).map_err(open_err)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;").map_err(open_err)?;
        conn.execute_batch(SCHEMA).map_err(open_err)?;

        info!("数据库已打开: {}", path.as_ref().display());
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// 内存数据库（测试用）
    pub fn in_memory() -> Result<Self, PersistenceError> {
        let open_err = |e| PersistenceError::new(PersistStage::Open, e);
        let conn = Connection::open_in_memory().map_err(open_err)?;
        conn.execute_batch(SCHEMA).map_err(open_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

#[async_trait]
impl EssayStore for SqliteEssayStore {
    async fn save_submission(&self, submission: &NewSubmission) -> Result<i64, PersistenceError> {
        let mut conn = self.conn.lock().await;
        let tx = conn
            .transaction()
            .map_err(|e| PersistenceError::new(PersistStage::Open, e))?;

        let author_id = get_or_create_author(&tx, &submission.authorname)
            .map_err(|e| PersistenceError::new(PersistStage::Author, e))?;

        tx.execute(
            "INSERT INTO essays (author_id, title, text, date_submitted) VALUES (?1, ?2, ?3, ?4)",
            params![
                author_id,
                submission.title,
                submission.text,
                submission.date_submitted
            ],
        )
        .map_err(|e| PersistenceError::new(PersistStage::Essay, e))?;
        let essay_id = tx.last_insert_rowid();

        insert_images(&tx, essay_id, &submission.image_paths)
            .map_err(|e| PersistenceError::new(PersistStage::Images, e))?;

        insert_grades(&tx, essay_id, &submission.grades)
            .map_err(|e| PersistenceError::new(PersistStage::Grades, e))?;

        tx.commit()
            .map_err(|e| PersistenceError::new(PersistStage::Commit, e))?;

        debug!(
            "作文 #{} 已入库: {} 张图片, {} 条评分",
            essay_id,
            submission.image_paths.len(),
            submission.grades.len()
        );
        Ok(essay_id)
    }

    async fn create_author(&self, authorname: &str, name: Option<&str>) -> Result<Author, PersistenceError> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO authors (authorname, name) VALUES (?1, ?2)",
            params![authorname, name],
        )
        .map_err(|e| PersistenceError::new(PersistStage::Author, e))?;

        Ok(Author {
            id: conn.last_insert_rowid(),
            authorname: authorname.to_string(),
            name: name.map(str::to_string),
        })
    }

    async fn list_authors(&self) -> Result<Vec<AuthorSummary>, PersistenceError> {
        let conn = self.conn.lock().await;
        query_authors(&conn).map_err(|e| PersistenceError::new(PersistStage::Query, e))
    }

    async fn author_grades(&self, authorname: &str) -> AppResult<Vec<StoredEssay>> {
        let conn = self.conn.lock().await;
        let query_err = |e| PersistenceError::new(PersistStage::Query, e);

        let author_id: Option<i64> = conn
            .query_row(
                "SELECT id FROM authors WHERE authorname = ?1",
                params![authorname],
                |row| row.get(0),
            )
            .optional()
            .map_err(query_err)?;
        let author_id = author_id.ok_or_else(|| NotFound::Author(authorname.to_string()))?;

        let essay_ids: Vec<i64> = {
            let mut stmt = conn
                .prepare("SELECT id FROM essays WHERE author_id = ?1 ORDER BY id")
                .map_err(query_err)?;
            let rows = stmt
                .query_map(params![author_id], |row| row.get(0))
                .map_err(query_err)?;
            let ids = rows.collect::<rusqlite::Result<Vec<i64>>>().map_err(query_err)?;
            ids
        };

        let mut essays = Vec::with_capacity(essay_ids.len());
        for essay_id in essay_ids {
            if let Some(essay) = load_essay(&conn, essay_id).map_err(query_err)? {
                essays.push(essay);
            }
        }
        Ok(essays)
    }

    async fn essay(&self, essay_id: i64) -> AppResult<StoredEssay> {
        let conn = self.conn.lock().await;
        let essay = load_essay(&conn, essay_id)
            .map_err(|e| PersistenceError::new(PersistStage::Query, e))?;
        Ok(essay.ok_or(NotFound::Essay(essay_id))?)
    }
}

// ---------------------------------------------------------------------------
// SQL helpers
// ---------------------------------------------------------------------------

fn get_or_create_author(tx: &Transaction<'_>, authorname: &str) -> rusqlite::Result<i64> {
    let existing: Option<i64> = tx
        .query_row(
            "SELECT id FROM authors WHERE authorname = ?1",
            params![authorname],
            |row| row.get(0),
        )
        .optional()?;

    match existing {
        Some(id) => Ok(id),
        None => {
            tx.execute(
                "INSERT INTO authors (authorname) VALUES (?1)",
                params![authorname],
            )?;
            Ok(tx.last_insert_rowid())
        }
    }
}

fn insert_images(tx: &Transaction<'_>, essay_id: i64, image_paths: &[String]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare("INSERT INTO essay_images (essay_id, image_path) VALUES (?1, ?2)")?;
    for path in image_paths {
        stmt.execute(params![essay_id, path])?;
    }
    Ok(())
}

fn insert_grades(tx: &Transaction<'_>, essay_id: i64, grades: &[GradeRecord]) -> rusqlite::Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO essay_grades (essay_id, grade_type, grade, comments) VALUES (?1, ?2, ?3, ?4)",
    )?;
    for grade in grades {
        stmt.execute(params![essay_id, grade.grade_type, grade.grade, grade.comments])?;
    }
    Ok(())
}

fn query_authors(conn: &Connection) -> rusqlite::Result<Vec<AuthorSummary>> {
    let mut author_stmt = conn.prepare("SELECT id, authorname, name FROM authors ORDER BY id")?;
    let authors = author_stmt
        .query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
            ))
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    let mut essay_stmt = conn.prepare(
        "SELECT id, title, date_submitted FROM essays WHERE author_id = ?1 ORDER BY id",
    )?;

    let mut summaries = Vec::with_capacity(authors.len());
    for (author_id, authorname, name) in authors {
        let essays = essay_stmt
            .query_map(params![author_id], |row| {
                Ok(EssaySummary {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    date_submitted: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        summaries.push(AuthorSummary {
            authorname,
            name,
            essays,
        });
    }
    Ok(summaries)
}

fn load_essay(conn: &Connection, essay_id: i64) -> rusqlite::Result<Option<StoredEssay>> {
    let essay = conn
        .query_row(
            "SELECT e.id, a.authorname, e.title, e.text, e.date_submitted
             FROM essays e JOIN authors a ON a.id = e.author_id
             WHERE e.id = ?1",
            params![essay_id],
            |row| {
                Ok(StoredEssay {
                    id: row.get(0)?,
                    authorname: row.get(1)?,
                    title: row.get(2)?,
                    text: row.get(3)?,
                    date_submitted: row.get(4)?,
                    grades: Vec::new(),
                    images: Vec::new(),
                })
            },
        )
        .optional()?;

    let Some(mut essay) = essay else {
        return Ok(None);
    };

    let mut grade_stmt = conn.prepare(
        "SELECT grade_type, grade, comments FROM essay_grades WHERE essay_id = ?1 ORDER BY id",
    )?;
    essay.grades = grade_stmt
        .query_map(params![essay_id], |row| {
            let grade: Option<i64> = row.get(1)?;
            Ok(GradeRecord {
                grade_type: row.get(0)?,
                grade: grade.and_then(|g| u8::try_from(g).ok()),
                comments: row.get(2)?,
            })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    essay
        .grades
        .sort_by_key(|g| rubric::catalog_position(&g.grade_type));

    let mut image_stmt =
        conn.prepare("SELECT image_path FROM essay_images WHERE essay_id = ?1 ORDER BY id")?;
    essay.images = image_stmt
        .query_map(params![essay_id], |row| row.get(0))?
        .collect::<rusqlite::Result<Vec<String>>>()?;

    Ok(Some(essay))
}
