use std::sync::Arc;

use access_engine::{AccessService, InMemoryStore, TenantSnapshot, setup_environment};
use anyhow::Context;

const USAGE: &str = "usage: access-engine <snapshot.json> <tenant_id> <user_id>";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 设置环境 (dotenv, 配置, 日志)
    let config = setup_environment()?;

    let mut args = std::env::args().skip(1);
    let (Some(path), Some(tenant_id), Some(user_id)) = (args.next(), args.next(), args.next())
    else {
        anyhow::bail!(USAGE);
    };
    let user_id: i64 = user_id
        .parse()
        .with_context(|| format!("invalid user id {user_id:?}"))?;

    // 2. 加载租户快照
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let snapshot: TenantSnapshot =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;
    tracing::info!(
        tenant_id = %snapshot.tenant_id,
        menus = snapshot.menus.len(),
        depts = snapshot.depts.len(),
        roles = snapshot.roles.len(),
        users = snapshot.users.len(),
        "Snapshot loaded"
    );

    let store = Arc::new(InMemoryStore::new());
    store.insert_snapshot(snapshot);

    // 3. 解析并输出权限上下文
    let service = AccessService::new(store, &config);
    let ctx = service.resolve_permissions(&tenant_id, user_id).await?;
    println!("{}", serde_json::to_string_pretty(&ctx)?);

    Ok(())
}
