//! Mapping resolved roots and flat rows into response records.
//!
//! Roots come out sorted by order id and lines by order item id, whatever
//! order the join rows arrived in.

use std::collections::BTreeMap;

use crate::catalog::{Order, OrderItem};
use crate::error::Error;
use crate::query::{FlatLine, Loader, OrderFlatRow};
use crate::storage::ReadScope;

use super::dto::{AddressDto, OrderDto, OrderGraph, OrderItemDto, OrderItemGraph, SimpleOrderDto};

fn sorted_roots(orders: &[Order]) -> Vec<&Order> {
    let mut roots: Vec<&Order> = orders.iter().collect();
    roots.sort_by_key(|order| order.id);
    roots
}

fn sorted_lines(
    order: &Order,
    loader: &Loader,
    scope: &ReadScope<'_>,
) -> Result<Vec<OrderItem>, Error> {
    let mut lines = loader.resolve_order_items(&order.order_items, scope)?;
    lines.sort_by_key(|line| line.id);
    Ok(lines)
}

/// Map orders to DTOs, resolving whatever is still lazy.
pub fn order_dtos(
    orders: &[Order],
    loader: &Loader,
    scope: &ReadScope<'_>,
) -> Result<Vec<OrderDto>, Error> {
    let mut dtos = Vec::with_capacity(orders.len());

    for order in sorted_roots(orders) {
        let member = loader.resolve(&order.member, scope)?;
        let delivery = loader.resolve(&order.delivery, scope)?;

        let mut order_items = Vec::new();
        for line in sorted_lines(order, loader, scope)? {
            let item = loader.resolve(&line.item, scope)?;
            order_items.push(OrderItemDto {
                item_name: item.name,
                order_price: line.order_price,
                count: line.count,
            });
        }

        dtos.push(OrderDto {
            order_id: order.id,
            member_name: member.name,
            order_date: order.order_date,
            order_status: order.status,
            address: AddressDto::from(&delivery.address),
            order_items,
        });
    }

    Ok(dtos)
}

/// Map orders to line-less DTOs. Never touches the item collection.
pub fn simple_order_dtos(
    orders: &[Order],
    loader: &Loader,
    scope: &ReadScope<'_>,
) -> Result<Vec<SimpleOrderDto>, Error> {
    sorted_roots(orders)
        .into_iter()
        .map(|order| -> Result<SimpleOrderDto, Error> {
            let member = loader.resolve(&order.member, scope)?;
            let delivery = loader.resolve(&order.delivery, scope)?;
            Ok(SimpleOrderDto {
                order_id: order.id,
                name: member.name,
                order_date: order.order_date,
                order_status: order.status,
                address: AddressDto::from(&delivery.address),
            })
        })
        .collect()
}

/// Resolve every relation and return the raw entity graph.
pub fn order_graphs(
    orders: &[Order],
    loader: &Loader,
    scope: &ReadScope<'_>,
) -> Result<Vec<OrderGraph>, Error> {
    let mut graphs = Vec::with_capacity(orders.len());

    for order in sorted_roots(orders) {
        let member = loader.resolve(&order.member, scope)?;
        let delivery = loader.resolve(&order.delivery, scope)?;

        let mut order_items = Vec::new();
        for line in sorted_lines(order, loader, scope)? {
            order_items.push(OrderItemGraph {
                id: line.id,
                order_price: line.order_price,
                count: line.count,
                item: loader.resolve(&line.item, scope)?,
            });
        }

        graphs.push(OrderGraph {
            id: order.id,
            order_date: order.order_date,
            status: order.status,
            member,
            delivery,
            order_items,
        });
    }

    Ok(graphs)
}

/// Regroup flat projection rows into order DTOs.
pub fn group_flat_rows(rows: Vec<OrderFlatRow>) -> Vec<OrderDto> {
    let mut groups: BTreeMap<i64, (OrderDto, Vec<FlatLine>)> = BTreeMap::new();

    for row in rows {
        let (_, lines) = groups.entry(row.order_id).or_insert_with(|| {
            let dto = OrderDto {
                order_id: row.order_id,
                member_name: row.member_name.clone(),
                order_date: row.order_date,
                order_status: row.order_status,
                address: AddressDto {
                    city: row.city.clone(),
                    street: row.street.clone(),
                    zipcode: row.zipcode.clone(),
                },
                order_items: Vec::new(),
            };
            (dto, Vec::new())
        });
        if let Some(line) = row.line {
            lines.push(line);
        }
    }

    groups
        .into_values()
        .map(|(mut dto, mut lines)| {
            lines.sort_by_key(|line| line.order_item_id);
            dto.order_items = lines
                .into_iter()
                .map(|line| OrderItemDto {
                    item_name: line.item_name,
                    order_price: line.order_price,
                    count: line.count,
                })
                .collect();
            dto
        })
        .collect()
}
