use serde::Deserialize;
use utoipa::ToSchema;

// Query structs keep page/per_page as direct fields: serde_urlencoded cannot
// drive Option<i64> through a flattened struct (flatten buffers every value
// as a string), so a nested Pagination would reject ?page=2 outright.
#[derive(Debug)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category: Option<String>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
}

impl OrderListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            per_page: self.per_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    #[test]
    fn normalize_defaults_and_clamps() {
        let p = Pagination {
            page: None,
            per_page: None,
        };
        assert_eq!(p.normalize(), (1, 20, 0));

        let p = Pagination {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(p.normalize(), (1, 100, 0));

        let p = Pagination {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(p.normalize(), (3, 10, 20));
    }

    #[test]
    fn product_query_accepts_pagination_params() {
        let uri: Uri = "/api/products?page=2&per_page=10&category=juices"
            .parse()
            .unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).expect("valid query");
        assert_eq!(query.pagination().normalize(), (2, 10, 10));
        assert_eq!(query.category.as_deref(), Some("juices"));
    }

    #[test]
    fn product_query_params_are_optional() {
        let uri: Uri = "/api/products".parse().unwrap();
        let Query(query) = Query::<ProductQuery>::try_from_uri(&uri).expect("valid query");
        assert_eq!(query.pagination().normalize(), (1, 20, 0));
        assert_eq!(query.category, None);
    }

    #[test]
    fn order_list_query_accepts_pagination_and_status() {
        let uri: Uri = "/api/admin/orders?page=3&per_page=50&status=placed"
            .parse()
            .unwrap();
        let Query(query) = Query::<OrderListQuery>::try_from_uri(&uri).expect("valid query");
        assert_eq!(query.pagination().normalize(), (3, 50, 100));
        assert_eq!(query.status.as_deref(), Some("placed"));
    }
}
