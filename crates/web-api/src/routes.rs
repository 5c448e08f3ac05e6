use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{IntoParams, OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use application::{SubscriptionDto, SubscriptionInput};

use crate::{
    error::{ApiError, ErrorBody},
    state::AppState,
};

pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// 订阅服务的 OpenAPI 文档，Swagger UI 挂载在 `/swagger`
#[derive(OpenApi)]
#[openapi(
    info(title = "Subscriptions API", description = "订阅记录的增删改查与按月份区间汇总"),
    paths(
        health,
        create_subscription,
        list_subscriptions,
        get_subscription,
        update_subscription,
        delete_subscription
    ),
    components(schemas(
        SubscriptionInput,
        SubscriptionDto,
        CreatedResponse,
        HealthResponse,
        ErrorBody
    )),
    tags((name = "subscriptions", description = "订阅记录"))
)]
pub struct ApiDoc;

/// 路由层的通用设置
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// 整个请求的处理上限
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(60),
        }
    }
}

/// 列表查询的月份区间，均为 `MM-YYYY`
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
struct PeriodQuery {
    /// 开始月份下界（含）
    from: Option<String>,
    /// 结束月份上界（含），给出时持续中的订阅不会返回
    to: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
struct CreatedResponse {
    id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    #[schema(example = "ok")]
    status: &'static str,
}

pub fn router(state: AppState, settings: HttpSettings) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .merge(SwaggerUi::new("/swagger").url(OPENAPI_PATH, ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new())
                .layer(TimeoutLayer::new(settings.request_timeout)),
        )
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route(
            "/subscriptions",
            get(list_subscriptions).post(create_subscription),
        )
        .route(
            "/subscriptions/{id}",
            get(get_subscription)
                .put(update_subscription)
                .delete(delete_subscription),
        )
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "服务存活", body = HealthResponse))
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[utoipa::path(
    post,
    path = "/api/subscriptions",
    tag = "subscriptions",
    request_body = SubscriptionInput,
    responses(
        (status = 201, description = "已创建", body = CreatedResponse),
        (status = 400, description = "请求体或日期格式错误", body = ErrorBody),
        (status = 500, description = "存储失败或超时", body = ErrorBody)
    )
)]
async fn create_subscription(
    State(state): State<AppState>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), ApiError> {
    let Json(input) = payload?;
    let id = state.subscription_service.create(input).await?;

    Ok((StatusCode::CREATED, Json(CreatedResponse { id: id.into() })))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "订阅 ID")),
    responses(
        (status = 200, body = SubscriptionDto),
        (status = 404, description = "订阅不存在", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
async fn get_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let subscription = state.subscription_service.get(&id).await?;
    Ok(Json(subscription.into()))
}

#[utoipa::path(
    put,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "订阅 ID")),
    request_body = SubscriptionInput,
    responses(
        (status = 200, description = "整体替换后的记录", body = SubscriptionDto),
        (status = 400, body = ErrorBody),
        (status = 404, body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
async fn update_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SubscriptionInput>, JsonRejection>,
) -> Result<Json<SubscriptionDto>, ApiError> {
    let Json(input) = payload?;
    let subscription = state.subscription_service.update(&id, input).await?;
    Ok(Json(subscription.into()))
}

#[utoipa::path(
    delete,
    path = "/api/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "订阅 ID")),
    responses(
        (status = 204, description = "已删除"),
        (status = 404, description = "订阅不存在", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
async fn delete_subscription(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.subscription_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "subscriptions",
    params(PeriodQuery),
    responses(
        (status = 200, body = [SubscriptionDto]),
        (status = 400, description = "月份格式错误", body = ErrorBody),
        (status = 500, body = ErrorBody)
    )
)]
async fn list_subscriptions(
    State(state): State<AppState>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Vec<SubscriptionDto>>, ApiError> {
    let items = state
        .subscription_service
        .list(query.from.as_deref(), query.to.as_deref())
        .await?;

    Ok(Json(items.into_iter().map(SubscriptionDto::from).collect()))
}
