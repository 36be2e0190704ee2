use chrono::NaiveDate;
use ulid::Ulid;

use crate::limits::*;
use crate::model::*;
use crate::observability::*;

use super::conflict::{
    check_facility_bookable, check_not_started, equipment_type_of, validate_not_past, validate_quantity,
    validate_window,
};
use super::gaps::{compute_gaps, covers};
use super::pool::{gaps_cover_hours, pool_gaps, units_free_for};
use super::queries::facility_busy;
use super::{kind_label, note_rejection, sort_equipment, sort_facility, BookingError, Engine};

impl Engine {
    // ── Creation ─────────────────────────────────────────────

    /// Book a facility for `[start, end)` on `date`. The record starts PENDING.
    pub async fn book_facility(
        &self,
        user: Ulid,
        facility: Ulid,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        self.try_book_facility(user, facility, date, start, end)
            .await
            .inspect_err(note_rejection)
    }

    async fn try_book_facility(
        &self,
        user: Ulid,
        facility: Ulid,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        let span = validate_window(start, end)?;
        check_facility_bookable(&self.catalog, &facility)?;
        validate_not_past(date, &span, self.clock())?;

        let mut guard = self.facility_bookings.write().await;
        if guard.len() >= MAX_BOOKINGS_PER_KIND {
            return Err(BookingError::LimitExceeded("too many facility bookings"));
        }
        let busy = facility_busy(&guard, &facility, date, None);
        if !covers(&compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR), &span) {
            return Err(BookingError::SlotUnavailable(span));
        }

        let id = Ulid::new();
        guard.push(FacilityBooking {
            id,
            facility,
            slot: BookingSlot::new(user, date, span),
        });
        sort_facility(&mut guard);
        drop(guard);

        metrics::counter!(BOOKINGS_CREATED_TOTAL, "kind" => "facility").increment(1);
        self.emit(user, Event::BookingCreated { id, kind: BookingKind::Facility });
        Ok(id)
    }

    /// Borrow `quantity` units of a borrowable type. The first free units in pool order are assigned.
    pub async fn borrow_equipment(
        &self,
        user: Ulid,
        type_id: Ulid,
        quantity: u32,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        self.try_borrow_equipment(user, type_id, quantity, date, start, end)
            .await
            .inspect_err(note_rejection)
    }

    async fn try_borrow_equipment(
        &self,
        user: Ulid,
        type_id: Ulid,
        quantity: u32,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        let span = validate_window(start, end)?;
        validate_quantity(quantity)?;
        let ty = equipment_type_of(&self.catalog, &type_id, EquipmentCategory::Borrowable)?;
        validate_not_past(date, &span, self.clock())?;

        let mut guard = self.equipment_bookings.write().await;
        if guard.len() >= MAX_BOOKINGS_PER_KIND {
            return Err(BookingError::LimitExceeded("too many equipment bookings"));
        }
        let units = self.pick_units(&guard, &ty.id, quantity, date, &span, None)?;

        let id = Ulid::new();
        guard.push(EquipmentBooking {
            id,
            equipment_type: ty.id,
            category: EquipmentCategory::Borrowable,
            units,
            quantity,
            slot: BookingSlot::new(user, date, span),
        });
        sort_equipment(&mut guard);
        drop(guard);

        metrics::counter!(BOOKINGS_CREATED_TOTAL, "kind" => "equipment").increment(1);
        self.emit(user, Event::BookingCreated { id, kind: BookingKind::Equipment });
        Ok(id)
    }

    /// Buy `quantity` items of a sellable type, collected during `[start, end)` on `date`.
    pub async fn buy_equipment(
        &self,
        user: Ulid,
        type_id: Ulid,
        quantity: u32,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        self.try_buy_equipment(user, type_id, quantity, date, start, end)
            .await
            .inspect_err(note_rejection)
    }

    async fn try_buy_equipment(
        &self,
        user: Ulid,
        type_id: Ulid,
        quantity: u32,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<Ulid, BookingError> {
        let span = validate_window(start, end)?;
        validate_quantity(quantity)?;
        let ty = equipment_type_of(&self.catalog, &type_id, EquipmentCategory::Sellable)?;
        validate_not_past(date, &span, self.clock())?;
        let representative = self
            .catalog
            .pool(&ty.id)
            .first()
            .copied()
            .ok_or(BookingError::InsufficientUnits { requested: quantity, available: 0 })?;

        let mut guard = self.equipment_bookings.write().await;
        if guard.len() >= MAX_BOOKINGS_PER_KIND {
            return Err(BookingError::LimitExceeded("too many equipment bookings"));
        }
        let id = Ulid::new();
        guard.push(EquipmentBooking {
            id,
            equipment_type: ty.id,
            category: EquipmentCategory::Sellable,
            units: vec![representative],
            quantity,
            slot: BookingSlot::new(user, date, span),
        });
        sort_equipment(&mut guard);
        drop(guard);

        metrics::counter!(BOOKINGS_CREATED_TOTAL, "kind" => "equipment").increment(1);
        self.emit(user, Event::BookingCreated { id, kind: BookingKind::Equipment });
        Ok(id)
    }

    /// First `quantity` units of the pool free for all of `span`.
    ///
    /// The pool gaps must cover every hour of the window before individual
    /// units are considered.
    fn pick_units(
        &self,
        bookings: &[EquipmentBooking],
        type_id: &Ulid,
        quantity: u32,
        date: NaiveDate,
        span: &HourSpan,
        exclude: Option<Ulid>,
    ) -> Result<Vec<Ulid>, BookingError> {
        let free = self.pool_free(bookings, type_id, date, exclude);
        let candidates = units_free_for(&free, span);
        let gaps = pool_gaps(&free, quantity as usize);
        if !gaps_cover_hours(&gaps, span) || candidates.len() < quantity as usize {
            return Err(BookingError::InsufficientUnits {
                requested: quantity,
                available: candidates.len() as u32,
            });
        }
        Ok(candidates.into_iter().take(quantity as usize).collect())
    }

    // ── Payment ──────────────────────────────────────────────

    /// PENDING → CONFIRMED for one record.
    pub async fn confirm(&self, id: Ulid) -> Result<(), BookingError> {
        self.try_confirm(id).await.inspect_err(note_rejection)
    }

    async fn try_confirm(&self, id: Ulid) -> Result<(), BookingError> {
        let user = {
            let mut facility = self.facility_bookings.write().await;
            if let Some(b) = facility.iter_mut().find(|b| b.id == id) {
                confirm_slot(id, &mut b.slot)?;
                b.slot.user
            } else {
                let mut equipment = self.equipment_bookings.write().await;
                let b = equipment
                    .iter_mut()
                    .find(|b| b.id == id)
                    .ok_or(BookingError::RecordNotFound(id))?;
                confirm_slot(id, &mut b.slot)?;
                b.slot.user
            }
        };
        metrics::counter!(BOOKINGS_CONFIRMED_TOTAL).increment(1);
        self.emit(user, Event::BookingConfirmed { id });
        Ok(())
    }

    /// Confirm every pending record of `user` (the payment step). Returns the confirmed ids.
    pub async fn confirm_pending(&self, user: Ulid) -> Vec<Ulid> {
        let mut confirmed = Vec::new();
        let mut facility = self.facility_bookings.write().await;
        let mut equipment = self.equipment_bookings.write().await;

        let slots = facility
            .iter_mut()
            .map(|b| (b.id, &mut b.slot))
            .chain(equipment.iter_mut().map(|b| (b.id, &mut b.slot)));
        for (id, slot) in slots {
            if slot.user == user && slot.status == BookingStatus::Pending {
                slot.status = BookingStatus::Confirmed;
                confirmed.push(id);
            }
        }
        drop(equipment);
        drop(facility);

        metrics::counter!(BOOKINGS_CONFIRMED_TOTAL).increment(confirmed.len() as u64);
        for id in &confirmed {
            self.emit(user, Event::BookingConfirmed { id: *id });
        }
        confirmed
    }

    // ── Updates ──────────────────────────────────────────────

    /// Move a booking to a new date and time.
    ///
    /// Facility records keep their facility; borrowable equipment records are
    /// re-assigned to the first free units of their pool. The record's own
    /// current slot does not block the move. On error nothing changes.
    pub async fn reschedule(
        &self,
        id: Ulid,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<BookingKind, BookingError> {
        self.try_reschedule(id, date, start, end)
            .await
            .inspect_err(note_rejection)
    }

    async fn try_reschedule(
        &self,
        id: Ulid,
        date: NaiveDate,
        start: Hour,
        end: Hour,
    ) -> Result<BookingKind, BookingError> {
        let span = validate_window(start, end)?;

        let user = {
            let mut facility = self.facility_bookings.write().await;
            if let Some(idx) = facility.iter().position(|b| b.id == id) {
                let current = &facility[idx];
                check_not_started(id, &current.slot, self.clock())?;
                check_facility_bookable(&self.catalog, &current.facility)?;
                validate_not_past(date, &span, self.clock())?;

                let busy = facility_busy(&facility, &current.facility, date, Some(id));
                if !covers(&compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR), &span) {
                    return Err(BookingError::SlotUnavailable(span));
                }

                let record = &mut facility[idx];
                record.slot.date = date;
                record.slot.span = span;
                let user = record.slot.user;
                sort_facility(&mut facility);
                Some(user)
            } else {
                None
            }
        };
        if let Some(user) = user {
            self.after_update(user, BookingKind::Facility, Event::BookingRescheduled { id, date, span });
            return Ok(BookingKind::Facility);
        }

        let mut equipment = self.equipment_bookings.write().await;
        let idx = equipment
            .iter()
            .position(|b| b.id == id)
            .ok_or(BookingError::RecordNotFound(id))?;
        let current = &equipment[idx];
        if current.is_sellable() {
            return Err(BookingError::NotUpdatable(id));
        }
        check_not_started(id, &current.slot, self.clock())?;
        validate_not_past(date, &span, self.clock())?;

        let units = self.pick_units(
            &equipment,
            &current.equipment_type,
            current.quantity,
            date,
            &span,
            Some(id),
        )?;

        let record = &mut equipment[idx];
        record.units = units;
        record.slot.date = date;
        record.slot.span = span;
        let user = record.slot.user;
        sort_equipment(&mut equipment);
        drop(equipment);

        self.after_update(user, BookingKind::Equipment, Event::BookingRescheduled { id, date, span });
        Ok(BookingKind::Equipment)
    }

    /// Swap the facility of a booking. The current slot must be free on the new facility.
    pub async fn reassign_facility(&self, id: Ulid, new_facility: Ulid) -> Result<(), BookingError> {
        self.try_reassign_facility(id, new_facility)
            .await
            .inspect_err(note_rejection)
    }

    async fn try_reassign_facility(&self, id: Ulid, new_facility: Ulid) -> Result<(), BookingError> {
        check_facility_bookable(&self.catalog, &new_facility)?;

        let mut facility = self.facility_bookings.write().await;
        let idx = facility
            .iter()
            .position(|b| b.id == id)
            .ok_or(BookingError::RecordNotFound(id))?;
        let current = &facility[idx];
        check_not_started(id, &current.slot, self.clock())?;

        let busy = facility_busy(&facility, &new_facility, current.slot.date, Some(id));
        if !covers(&compute_gaps(&busy, OPENING_HOUR, CLOSING_HOUR), &current.slot.span) {
            return Err(BookingError::SlotUnavailable(current.slot.span));
        }

        let record = &mut facility[idx];
        record.facility = new_facility;
        let user = record.slot.user;
        drop(facility);

        self.after_update(
            user,
            BookingKind::Facility,
            Event::FacilityReassigned { id, facility: new_facility },
        );
        Ok(())
    }

    fn after_update(&self, user: Ulid, kind: BookingKind, event: Event) {
        metrics::counter!(BOOKINGS_UPDATED_TOTAL, "kind" => kind_label(kind)).increment(1);
        self.emit(user, event);
    }

    // ── Cancellation ─────────────────────────────────────────

    /// Remove a booking that has not started yet.
    pub async fn cancel(&self, id: Ulid) -> Result<BookingKind, BookingError> {
        self.try_cancel(id).await.inspect_err(note_rejection)
    }

    async fn try_cancel(&self, id: Ulid) -> Result<BookingKind, BookingError> {
        let removed = {
            let mut facility = self.facility_bookings.write().await;
            match facility.iter().position(|b| b.id == id) {
                Some(idx) => {
                    check_not_started(id, &facility[idx].slot, self.clock())?;
                    Some(facility.remove(idx).slot.user)
                }
                None => None,
            }
        };
        let (user, kind) = match removed {
            Some(user) => (user, BookingKind::Facility),
            None => {
                let mut equipment = self.equipment_bookings.write().await;
                let idx = equipment
                    .iter()
                    .position(|b| b.id == id)
                    .ok_or(BookingError::RecordNotFound(id))?;
                check_not_started(id, &equipment[idx].slot, self.clock())?;
                (equipment.remove(idx).slot.user, BookingKind::Equipment)
            }
        };

        metrics::counter!(BOOKINGS_CANCELLED_TOTAL, "kind" => kind_label(kind)).increment(1);
        self.emit(user, Event::BookingCancelled { id });
        Ok(kind)
    }

    // ── Status sweep ─────────────────────────────────────────

    /// Mark every active booking whose end hour has been reached as ENDED.
    ///
    /// A booking ending at exactly the current hour counts as ended, for
    /// facilities and equipment alike. Bookings on earlier dates are ended
    /// regardless of hour.
    pub async fn update_status_sweep(&self) -> SweepReport {
        let today = self.clock.today();
        let hour = self.clock.current_hour();
        let mut report = SweepReport::default();
        let mut notices = Vec::new();

        let mut facility = self.facility_bookings.write().await;
        let mut equipment = self.equipment_bookings.write().await;

        for b in facility.iter_mut() {
            if b.slot.status.is_active() && b.slot.has_elapsed(today, hour) {
                b.slot.status = BookingStatus::Ended;
                report.facility.push(b.id);
                notices.push((b.slot.user, b.id));
            }
        }
        for b in equipment.iter_mut() {
            if b.slot.status.is_active() && b.slot.has_elapsed(today, hour) {
                b.slot.status = BookingStatus::Ended;
                report.equipment.push(b.id);
                notices.push((b.slot.user, b.id));
            }
        }

        let active = facility.iter().filter(|b| b.slot.status.is_active()).count()
            + equipment.iter().filter(|b| b.slot.status.is_active()).count();
        drop(equipment);
        drop(facility);

        metrics::counter!(BOOKINGS_ENDED_TOTAL).increment(report.total() as u64);
        metrics::gauge!(ACTIVE_BOOKINGS).set(active as f64);
        for (user, id) in notices {
            self.emit(user, Event::BookingEnded { id });
        }
        report
    }
}

fn confirm_slot(id: Ulid, slot: &mut BookingSlot) -> Result<(), BookingError> {
    if slot.status != BookingStatus::Pending {
        return Err(BookingError::InvalidTransition {
            id,
            from: slot.status,
            to: BookingStatus::Confirmed,
        });
    }
    slot.status = BookingStatus::Confirmed;
    Ok(())
}
