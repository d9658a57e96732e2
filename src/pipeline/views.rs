//! The fixed charts of the two dashboards
//!
//! Each view pairs a set of selector fields (the dropdowns a user picks
//! from) with a query shape. [`run_view`] is the single entry point that
//! recomputes a view from scratch for a given [`FilterState`].

use clap::ValueEnum;
use serde::Serialize;

use super::error::QueryError;
use super::fields::{PricingField, PricingMeasure, ShipmentField, ShipmentMeasure};
use super::query::{
    aggregate, choropleth, hierarchy, Aggregate, AggregateResult, ChoroplethResult, FilterState,
    GroupSpec, HierarchyResult, Record,
};

/// What a view computes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewShape<F, M> {
    /// Grouped rows for bar and scatter charts
    Table(GroupSpec<F, M>),
    /// One value per region
    Map {
        region: F,
        aggregate: Aggregate<M>,
        nonzero: Option<M>,
    },
    /// Per-level totals along a dimension path
    Sunburst(GroupSpec<F, M>),
}

/// A named dashboard chart over one record type.
pub trait View: Copy + 'static {
    type Record: Record;

    fn all() -> &'static [Self];

    /// Identifier used on the command line and in exports.
    fn name(&self) -> &'static str;

    fn title(&self) -> &'static str;

    /// Fields a user is expected to pick a value for.
    fn selectors(&self) -> &'static [<Self::Record as Record>::Field];

    fn shape(
        &self,
    ) -> ViewShape<<Self::Record as Record>::Field, <Self::Record as Record>::Measure>;
}

/// Computed output of one view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewResult {
    Table(AggregateResult),
    Map(ChoroplethResult),
    Sunburst(HierarchyResult),
}

impl ViewResult {
    pub fn is_empty(&self) -> bool {
        match self {
            ViewResult::Table(result) => result.is_empty(),
            ViewResult::Map(result) => result.is_empty(),
            ViewResult::Sunburst(result) => result.is_empty(),
        }
    }
}

/// Recompute a view over `records`.
pub fn run_view<V: View>(
    view: V,
    records: &[V::Record],
    filter: &FilterState<<V::Record as Record>::Field>,
) -> Result<ViewResult, QueryError> {
    let result = match view.shape() {
        ViewShape::Table(spec) => ViewResult::Table(aggregate(records, filter, &spec)?),
        ViewShape::Map {
            region,
            aggregate,
            nonzero,
        } => ViewResult::Map(choropleth(records, filter, region, aggregate, nonzero)),
        ViewShape::Sunburst(spec) => ViewResult::Sunburst(hierarchy(records, filter, &spec)?),
    };
    Ok(result)
}

/// Selectors of `view` that `filter` leaves unset.
pub fn missing_selectors<V: View>(
    view: V,
    filter: &FilterState<<V::Record as Record>::Field>,
) -> Vec<<V::Record as Record>::Field> {
    view.selectors()
        .iter()
        .copied()
        .filter(|field| filter.value_for(*field).is_none())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ShipmentView {
    TransportModes,
    TransitTimes,
    DistanceRanges,
    DistanceVsTransit,
    TransportByGroup,
    TransportByFc,
    TransportByProduct,
    StateMap,
    StateSunburst,
}

impl View for ShipmentView {
    type Record = super::enrich::EnrichedShipment;

    fn all() -> &'static [Self] {
        &[
            ShipmentView::TransportModes,
            ShipmentView::TransitTimes,
            ShipmentView::DistanceRanges,
            ShipmentView::DistanceVsTransit,
            ShipmentView::TransportByGroup,
            ShipmentView::TransportByFc,
            ShipmentView::TransportByProduct,
            ShipmentView::StateMap,
            ShipmentView::StateSunburst,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            ShipmentView::TransportModes => "transport-modes",
            ShipmentView::TransitTimes => "transit-times",
            ShipmentView::DistanceRanges => "distance-ranges",
            ShipmentView::DistanceVsTransit => "distance-vs-transit",
            ShipmentView::TransportByGroup => "transport-by-group",
            ShipmentView::TransportByFc => "transport-by-fc",
            ShipmentView::TransportByProduct => "transport-by-product",
            ShipmentView::StateMap => "state-map",
            ShipmentView::StateSunburst => "state-sunburst",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ShipmentView::TransportModes => "Total orders per shipping method",
            ShipmentView::TransitTimes => "Days between order placed and order delivered",
            ShipmentView::DistanceRanges => "Distance between FC zipcode and recipient zipcode",
            ShipmentView::DistanceVsTransit => "Shipping distance against days in transit",
            ShipmentView::TransportByGroup => "Category shipping method breakdown",
            ShipmentView::TransportByFc => "Shipping method per fulfillment center",
            ShipmentView::TransportByProduct => "Shipping method per SKU",
            ShipmentView::StateMap => "Total shipments per state",
            ShipmentView::StateSunburst => "Shipments per state, FC and shipping method",
        }
    }

    fn selectors(&self) -> &'static [ShipmentField] {
        match self {
            ShipmentView::TransportModes => &[],
            ShipmentView::TransitTimes
            | ShipmentView::DistanceRanges
            | ShipmentView::DistanceVsTransit
            | ShipmentView::TransportByGroup
            | ShipmentView::TransportByFc => &[ShipmentField::Group],
            ShipmentView::TransportByProduct | ShipmentView::StateSunburst => {
                &[ShipmentField::Product]
            }
            ShipmentView::StateMap => &[
                ShipmentField::Product,
                ShipmentField::FulfillmentCenter,
                ShipmentField::TransportMode,
            ],
        }
    }

    fn shape(&self) -> ViewShape<ShipmentField, ShipmentMeasure> {
        use ShipmentField::*;
        match self {
            ShipmentView::TransportModes => ViewShape::Table(GroupSpec::count(vec![TransportMode])),
            ShipmentView::TransitTimes => {
                ViewShape::Table(GroupSpec::count(vec![Group, TransportMode, TransitBucket]))
            }
            ShipmentView::DistanceRanges => {
                ViewShape::Table(GroupSpec::count(vec![Group, TransportMode, DistanceBucket]))
            }
            ShipmentView::DistanceVsTransit => ViewShape::Table(GroupSpec::count(vec![
                Group,
                TransportMode,
                DistanceMiles,
                TransitDays,
            ])),
            ShipmentView::TransportByGroup => {
                ViewShape::Table(GroupSpec::count(vec![Group, TransportMode]))
            }
            ShipmentView::TransportByFc => {
                ViewShape::Table(GroupSpec::count(vec![Group, FulfillmentCenter, TransportMode]))
            }
            ShipmentView::TransportByProduct => {
                ViewShape::Table(GroupSpec::count(vec![Product, TransportMode]))
            }
            ShipmentView::StateMap => ViewShape::Map {
                region: State,
                aggregate: Aggregate::Count,
                nonzero: None,
            },
            ShipmentView::StateSunburst => ViewShape::Sunburst(GroupSpec::count(vec![
                State,
                FulfillmentCenter,
                TransportMode,
            ])),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum PricingView {
    ProductsByState,
    ProductsByCounty,
    AverageCost,
    OverspendMap,
    OverspendSunburst,
}

impl View for PricingView {
    type Record = super::pricing::MergedPricingRecord;

    fn all() -> &'static [Self] {
        &[
            PricingView::ProductsByState,
            PricingView::ProductsByCounty,
            PricingView::AverageCost,
            PricingView::OverspendMap,
            PricingView::OverspendSunburst,
        ]
    }

    fn name(&self) -> &'static str {
        match self {
            PricingView::ProductsByState => "products-by-state",
            PricingView::ProductsByCounty => "products-by-county",
            PricingView::AverageCost => "average-cost",
            PricingView::OverspendMap => "overspend-map",
            PricingView::OverspendSunburst => "overspend-sunburst",
        }
    }

    fn title(&self) -> &'static str {
        match self {
            PricingView::ProductsByState => "Total shipments per product",
            PricingView::ProductsByCounty => "Recipient shipment breakdown per state and county",
            PricingView::AverageCost => "Outbound spend per state",
            PricingView::OverspendMap => "Overspend per sending FC and state",
            PricingView::OverspendSunburst => "Overspend per vendor, sending FC, state and product",
        }
    }

    fn selectors(&self) -> &'static [PricingField] {
        match self {
            PricingView::ProductsByCounty => &[PricingField::State],
            PricingView::OverspendMap => &[PricingField::SendingZip],
            PricingView::ProductsByState
            | PricingView::AverageCost
            | PricingView::OverspendSunburst => &[],
        }
    }

    fn shape(&self) -> ViewShape<PricingField, PricingMeasure> {
        use PricingField::*;
        match self {
            PricingView::ProductsByState => ViewShape::Table(GroupSpec::count(vec![Product, State])),
            PricingView::ProductsByCounty => {
                ViewShape::Table(GroupSpec::count(vec![Product, County]))
            }
            PricingView::AverageCost => ViewShape::Table(GroupSpec::mean(
                vec![Product, State],
                PricingMeasure::ShippingPrice,
            )),
            PricingView::OverspendMap => ViewShape::Map {
                region: StateAbbr,
                aggregate: Aggregate::Sum(PricingMeasure::PricingDifference),
                nonzero: None,
            },
            PricingView::OverspendSunburst => ViewShape::Sunburst(
                GroupSpec::sum(
                    vec![OptimalVendor, SendingZip, State, Product],
                    PricingMeasure::PricingDifference,
                )
                .nonzero(PricingMeasure::PricingDifference),
            ),
        }
    }
}
