//! GraphQL query documents for the Admin API.
//!
//! One document per entity type, with the field selection fixed at compile
//! time. Pagination variables are always `$first: Int!, $after: String`;
//! nested child connections are bounded single pages (variants, images,
//! line items, collection members) fetched with the parent.

/// Shop identity and defaults (no pagination).
pub const SHOP_QUERY: &str = r"
query ShopInfo {
  shop {
    id
    name
    email
    myshopifyDomain
    currencyCode
  }
}
";

/// One page of products with nested variants and images.
pub const PRODUCTS_QUERY: &str = r"
query ProductsPage($first: Int!, $after: String) {
  products(first: $first, after: $after) {
    edges {
      node {
        id
        title
        handle
        vendor
        status
        createdAt
        updatedAt
        variants(first: 100) {
          edges {
            node {
              id
              title
              price
              sku
              inventoryQuantity
              createdAt
              updatedAt
            }
          }
        }
        images(first: 50) {
          edges {
            node {
              id
              altText
              width
              height
              url
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// One page of customers with their addresses.
pub const CUSTOMERS_QUERY: &str = r"
query CustomersPage($first: Int!, $after: String) {
  customers(first: $first, after: $after) {
    edges {
      node {
        id
        firstName
        lastName
        email
        phone
        numberOfOrders
        amountSpent {
          amount
          currencyCode
        }
        createdAt
        updatedAt
        defaultAddress {
          id
        }
        addresses {
          id
          address1
          address2
          city
          province
          country
          zip
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// One page of orders with line items and both addresses.
pub const ORDERS_QUERY: &str = r"
query OrdersPage($first: Int!, $after: String) {
  orders(first: $first, after: $after) {
    edges {
      node {
        id
        number
        displayFinancialStatus
        displayFulfillmentStatus
        currencyCode
        totalPriceSet {
          shopMoney {
            amount
            currencyCode
          }
        }
        customer {
          id
        }
        processedAt
        createdAt
        updatedAt
        shippingAddress {
          firstName
          lastName
          address1
          address2
          city
          province
          country
          zip
          phone
        }
        billingAddress {
          firstName
          lastName
          address1
          address2
          city
          province
          country
          zip
          phone
        }
        lineItems(first: 100) {
          edges {
            node {
              id
              quantity
              variant {
                id
              }
              product {
                id
              }
              originalUnitPriceSet {
                shopMoney {
                  amount
                }
              }
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// One page of collections with member product ids.
pub const COLLECTIONS_QUERY: &str = r"
query CollectionsPage($first: Int!, $after: String) {
  collections(first: $first, after: $after) {
    edges {
      node {
        id
        handle
        title
        updatedAt
        products(first: 250) {
          edges {
            node {
              id
            }
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// All webhook subscriptions currently configured on the platform.
pub const WEBHOOK_SUBSCRIPTIONS_QUERY: &str = r"
query WebhookSubscriptions($first: Int!) {
  webhookSubscriptions(first: $first) {
    edges {
      node {
        id
        topic
        endpoint {
          __typename
          ... on WebhookHttpEndpoint {
            callbackUrl
          }
        }
      }
    }
    pageInfo {
      hasNextPage
      endCursor
    }
  }
}
";

/// Create one webhook subscription.
pub const WEBHOOK_SUBSCRIPTION_CREATE: &str = r"
mutation WebhookSubscriptionCreate($topic: WebhookSubscriptionTopic!, $webhookSubscription: WebhookSubscriptionInput!) {
  webhookSubscriptionCreate(topic: $topic, webhookSubscription: $webhookSubscription) {
    webhookSubscription {
      id
    }
    userErrors {
      field
      message
    }
  }
}
";

/// Delete one webhook subscription by id.
pub const WEBHOOK_SUBSCRIPTION_DELETE: &str = r"
mutation WebhookSubscriptionDelete($id: ID!) {
  webhookSubscriptionDelete(id: $id) {
    deletedWebhookSubscriptionId
    userErrors {
      field
      message
    }
  }
}
";
