use freetunes_core::{error::Result, types::*, TunesError};
use sqlx::{sqlite::SqliteRow, QueryBuilder, Row, Sqlite, SqlitePool};

fn map_report(row: &SqliteRow) -> Result<Report> {
    let status: String = row.get("status");
    Ok(Report {
        id: row.get("id"),
        user_id: row.get("reporter_id"),
        song_id: row.get("song_id"),
        reason: row.get("reason"),
        detail: row.get("detail"),
        status: status.parse().map_err(TunesError::Other)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// File a pending report
pub async fn create(pool: &SqlitePool, report: &CreateReport) -> Result<ReportId> {
    let id = ReportId::generate();
    let now = crate::now();

    sqlx::query(
        r#"
        INSERT INTO reports (id, reporter_id, song_id, reason, detail, status,
                             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&report.user_id)
    .bind(&report.song_id)
    .bind(&report.reason)
    .bind(&report.detail)
    .bind(ReportStatus::Pending.as_str())
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(id)
}

pub async fn get_by_id(pool: &SqlitePool, id: &ReportId) -> Result<Option<Report>> {
    let row = sqlx::query("SELECT * FROM reports WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(map_report).transpose()
}

/// Reports, oldest first, optionally restricted to one status
pub async fn list(pool: &SqlitePool, status: Option<ReportStatus>) -> Result<Vec<Report>> {
    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM reports");
    if let Some(status) = status {
        qb.push(" WHERE status = ").push_bind(status.as_str());
    }
    qb.push(" ORDER BY created_at, rowid");

    let rows = qb.build().fetch_all(pool).await?;
    rows.iter().map(map_report).collect()
}

/// Move a report to another moderation state
pub async fn set_status(pool: &SqlitePool, id: &ReportId, status: ReportStatus) -> Result<()> {
    let result = sqlx::query("UPDATE reports SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(crate::now())
        .bind(id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(TunesError::not_found("Report not found"));
    }
    Ok(())
}
